// src/config.rs
// =============================================================================
// The crawl policy: everything one run needs to know, fixed before it starts.
//
// Built with CrawlConfig::builder(root) so the root URL and limits are
// validated in one place. A bad root address is a configuration error and
// stops us before any request is made.
// =============================================================================

use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_CONCURRENCY: usize = 4;
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_TIME: Duration = Duration::from_secs(60);
pub const DEFAULT_IDLE_INTERVAL: Duration = Duration::from_millis(50);
pub const DEFAULT_USER_AGENT: &str = concat!("sitespider/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid root URL '{root}': {source}")]
    InvalidRoot {
        root: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid root URL '{0}': must be an absolute http(s) URL with a host")]
    UnsupportedRoot(String),

    #[error("concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// Immutable per-run settings. Build one with [`CrawlConfig::builder`].
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub root: Url,
    pub root_host: String,
    pub ignore_robots: bool,
    pub follow_subdomains: bool,
    pub resolve_against_page: bool,
    /// How many links away from the root the crawl may go. None is unbounded.
    pub max_depth: Option<usize>,
    pub concurrency: usize,
    pub fetch_timeout: Duration,
    pub max_time: Duration,
    pub idle_interval: Duration,
    pub user_agent: String,
}

impl CrawlConfig {
    pub fn builder(root: impl Into<String>) -> CrawlConfigBuilder {
        CrawlConfigBuilder {
            root: root.into(),
            ignore_robots: false,
            follow_subdomains: false,
            resolve_against_page: false,
            max_depth: None,
            concurrency: DEFAULT_CONCURRENCY,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_time: DEFAULT_MAX_TIME,
            idle_interval: DEFAULT_IDLE_INTERVAL,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CrawlConfigBuilder {
    root: String,
    ignore_robots: bool,
    follow_subdomains: bool,
    resolve_against_page: bool,
    max_depth: Option<usize>,
    concurrency: usize,
    fetch_timeout: Duration,
    max_time: Duration,
    idle_interval: Duration,
    user_agent: String,
}

impl CrawlConfigBuilder {
    pub fn ignore_robots(mut self, ignore: bool) -> Self {
        self.ignore_robots = ignore;
        self
    }

    pub fn follow_subdomains(mut self, follow: bool) -> Self {
        self.follow_subdomains = follow;
        self
    }

    pub fn resolve_against_page(mut self, resolve: bool) -> Self {
        self.resolve_against_page = resolve;
        self
    }

    /// Depth 0 fetches only the root, 1 adds the pages it links to, and so on.
    pub fn max_depth(mut self, depth: impl Into<Option<usize>>) -> Self {
        self.max_depth = depth.into();
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn max_time(mut self, max_time: Duration) -> Self {
        self.max_time = max_time;
        self
    }

    #[cfg(test)]
    pub fn idle_interval(mut self, interval: Duration) -> Self {
        self.idle_interval = interval;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    pub fn build(self) -> Result<CrawlConfig, ConfigError> {
        let root = Url::parse(&self.root).map_err(|source| ConfigError::InvalidRoot {
            root: self.root.clone(),
            source,
        })?;

        if !matches!(root.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedRoot(self.root));
        }
        let root_host = match root.host_str() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => return Err(ConfigError::UnsupportedRoot(self.root)),
        };

        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.fetch_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("timeout"));
        }
        if self.max_time.is_zero() {
            return Err(ConfigError::ZeroDuration("max-time"));
        }

        Ok(CrawlConfig {
            root,
            root_host,
            ignore_robots: self.ignore_robots,
            follow_subdomains: self.follow_subdomains,
            resolve_against_page: self.resolve_against_page,
            max_depth: self.max_depth,
            concurrency: self.concurrency,
            fetch_timeout: self.fetch_timeout,
            max_time: self.max_time,
            idle_interval: self.idle_interval,
            user_agent: self.user_agent,
        })
    }
}
