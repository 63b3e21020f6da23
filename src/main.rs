// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing) on stderr
// 3. Build the crawl configuration and run the spider
// 4. Print the sitemap on stdout (HTML, or JSON with --json)
// 5. Exit with proper code (0 = success, 2 = error)
//
// Logs go to stderr so the sitemap on stdout can be piped into a file.
// =============================================================================

mod cli;      // src/cli.rs - command-line parsing
mod config;   // src/config.rs - validated crawl settings
mod crawl;    // src/crawl/ - the spider itself
mod extract;  // src/extract/ - pulling links and assets out of HTML
mod fetch;    // src/fetch/ - HTTP client
mod pool;     // src/pool/ - generic worker pool
mod report;   // src/report/ - the sitemap

use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, LogFormat};
use config::CrawlConfig;
use crawl::Spider;

const DEFAULT_LOG_FILTER: &str = "sitespider=info,warn";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format);

    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            // {:#} prints the whole cause chain on one line
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// RUST_LOG wins when set; otherwise --verbose picks between info and debug.
fn init_tracing(verbose: bool, format: LogFormat) {
    let fallback = if verbose { "sitespider=debug,info" } else { DEFAULT_LOG_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Start {
            root,
            ignore_robots,
            concurrency,
            timeout,
            max_time,
            max_depth,
            follow_subdomains,
            resolve_against_page,
            user_agent,
            json,
        } => {
            let config = CrawlConfig::builder(root)
                .ignore_robots(ignore_robots)
                .concurrency(concurrency)
                .fetch_timeout(Duration::from_secs(timeout))
                .max_time(Duration::from_secs(max_time))
                .max_depth(max_depth)
                .follow_subdomains(follow_subdomains)
                .resolve_against_page(resolve_against_page)
                .user_agent(user_agent)
                .build()
                .context("invalid configuration")?;

            handle_start(config, json).await
        }
    }
}

// Handles the 'start' subcommand
async fn handle_start(config: CrawlConfig, json: bool) -> Result<()> {
    let root = config.root.clone();
    let spider = Spider::new(config).context("could not set up the spider")?;

    let summary = spider
        .run()
        .await
        .with_context(|| format!("crawl of {} failed", root))?;

    if spider.sitemap().is_empty() {
        info!(skipped = summary.pages_skipped, "No pages were fetched");
    } else {
        info!(pages = spider.sitemap().len(), "Rendering sitemap");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        spider.sitemap().render_json(&mut out)?;
    } else {
        spider.sitemap().render_html(&mut out)?;
    }
    out.flush()?;
    Ok(())
}
