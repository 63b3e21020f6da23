// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use clap's "derive" API: the CLI structure is plain Rust structs and
// enums, and the #[...] attributes describe flags, defaults and help text.
// =============================================================================

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::{DEFAULT_CONCURRENCY, DEFAULT_USER_AGENT};

#[derive(Parser, Debug)]
#[command(
    name = "sitespider",
    version,
    about = "Crawl a website and print a sitemap of its pages, links and assets",
    long_about = "sitespider starts at a root URL, visits every page on the same site exactly once \
                  (honouring robots.txt), and prints what each page links to and which assets it uses."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log format on stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the spider
    ///
    /// Example: sitespider start --root https://example.com --concurrency 8
    Start {
        /// Root URL to spider from
        #[arg(short, long)]
        root: String,

        /// Ignore robots.txt
        #[arg(short, long)]
        ignore_robots: bool,

        /// Number of pages fetched in parallel
        #[arg(short, long, default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,

        /// Per-request timeout, in seconds
        #[arg(short, long, default_value_t = 10)]
        timeout: u64,

        /// Give up on the whole crawl after this many seconds
        #[arg(long, default_value_t = 60)]
        max_time: u64,

        /// Follow links at most this many hops from the root (0 = root only).
        /// Unlimited when not given.
        #[arg(short = 'd', long)]
        max_depth: Option<usize>,

        /// Treat subdomains of the root host as part of the site
        #[arg(long)]
        follow_subdomains: bool,

        /// Resolve relative links against the page they appear on instead of the root
        #[arg(long)]
        resolve_against_page: bool,

        /// User-Agent header, also used to pick robots.txt rules
        #[arg(long, default_value = DEFAULT_USER_AGENT)]
        user_agent: String,

        /// Print the sitemap as JSON instead of HTML
        #[arg(long)]
        json: bool,
    },
}
