// src/crawl/error.rs

use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::fetch::FetchError;
use crate::pool::PoolError;

/// Everything that can end a crawl run early.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("could not build HTTP client")]
    Client(#[source] FetchError),

    /// robots.txt could not be fetched at all; no page was crawled.
    #[error("could not read robots.txt")]
    Robots(#[source] FetchError),

    #[error("failed to fetch {url}")]
    Fetch {
        url: Url,
        #[source]
        source: FetchError,
    },

    /// The page was left out, but the crawl goes on.
    #[error("skipped {url}")]
    PageSkipped {
        url: Url,
        #[source]
        source: FetchError,
    },

    #[error("crawl did not finish within {0:?}")]
    DeadlineExceeded(Duration),

    #[error("crawl is already running")]
    AlreadyRunning,

    #[error("worker pool task failed")]
    PoolTask(#[from] tokio::task::JoinError),
}

impl CrawlError {
    /// Errors the pool should log and move past instead of stopping.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CrawlError::PageSkipped { .. })
    }
}

impl From<PoolError<CrawlError>> for CrawlError {
    fn from(error: PoolError<CrawlError>) -> Self {
        match error {
            PoolError::AlreadyRunning => CrawlError::AlreadyRunning,
            PoolError::Worker(e) => e,
        }
    }
}
