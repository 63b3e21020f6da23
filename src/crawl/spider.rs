// src/crawl/spider.rs
// =============================================================================
// The crawl orchestrator.
//
// How a run works:
// 1. Read robots.txt once (unless told to ignore it)
// 2. Put the root URL in the frontier at depth 0 and count it as pending work
// 3. Start a worker pool whose unit of work is one crawl step:
//      pop -> robots check -> fetch -> extract -> filter -> admit -> report
// 4. Wait until the pending-work counter hits zero, then stop the pool
//
// Any fatal step error stops the pool, and run() returns that error. When the
// whole-run deadline (max_time) passes, the pool is stopped the same way:
// no new work is handed out, in-flight fetches finish (each is bounded by
// fetch_timeout), and run() returns DeadlineExceeded once every worker exited.
//
// Pages that redirect off the site or are too large are skipped. Their error
// goes back to the pool as Outcome::Retry, which logs it and carries on.
// =============================================================================

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::error::CrawlError;
use super::frontier::{Frontier, Queued, Seen};
use super::links::{self, LinkPolicy};
use super::pending::PendingWork;
use super::robots::{self, RobotsPolicy};
use crate::config::CrawlConfig;
use crate::extract::extract;
use crate::fetch::{Fetch, FetchError, HttpFetcher};
use crate::pool::{Outcome, Worker, WorkerPool};
use crate::report::Sitemap;

/// Totals for one finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CrawlSummary {
    pub pages_fetched: usize,
    pub pages_skipped: usize,
    pub urls_seen: usize,
}

pub struct Spider<F: Fetch = HttpFetcher> {
    config: Arc<CrawlConfig>,
    fetcher: Arc<F>,
    sitemap: Arc<Sitemap>,
}

impl Spider<HttpFetcher> {
    /// A spider that fetches over the network.
    pub fn new(config: CrawlConfig) -> Result<Self, CrawlError> {
        let site = LinkPolicy::from_config(&config);
        let fetcher = HttpFetcher::new(&config.user_agent, config.fetch_timeout, move |url| {
            site.is_internal_url(url)
        })
        .map_err(CrawlError::Client)?;
        Ok(Self::with_fetcher(config, fetcher))
    }
}

impl<F: Fetch> Spider<F> {
    pub fn with_fetcher(config: CrawlConfig, fetcher: F) -> Self {
        Self {
            config: Arc::new(config),
            fetcher: Arc::new(fetcher),
            sitemap: Arc::new(Sitemap::new()),
        }
    }

    /// Everything recorded so far, including pages from a run that failed.
    pub fn sitemap(&self) -> &Sitemap {
        &self.sitemap
    }

    #[cfg(test)]
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Crawls the site. Returns once every reachable internal page has been
    /// processed, or with the first fatal error.
    pub async fn run(&self) -> Result<CrawlSummary, CrawlError> {
        let config = &self.config;
        info!(root = %config.root, concurrency = config.concurrency, "Starting crawl");

        let robots = if config.ignore_robots {
            info!("Ignoring robots.txt");
            RobotsPolicy::AllowAll
        } else {
            fetch_robots(self.fetcher.as_ref(), config).await?
        };

        let step = CrawlStep {
            fetcher: Arc::clone(&self.fetcher),
            sitemap: Arc::clone(&self.sitemap),
            links: LinkPolicy::from_config(config),
            robots,
            user_agent: config.user_agent.clone(),
            fetch_timeout: config.fetch_timeout,
            idle_interval: config.idle_interval,
            max_depth: config.max_depth,
            frontier: Frontier::new(),
            pending: PendingWork::new(),
            fetched: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
        };
        let mut root = config.root.clone();
        root.set_fragment(None);
        step.pending.add(1);
        step.frontier.admit(root, 0);

        let pool = Arc::new(WorkerPool::new(step, config.concurrency));
        let mut running = tokio::spawn({
            let pool = Arc::clone(&pool);
            async move { pool.start().await }
        });

        let finished = tokio::time::timeout(config.max_time, async {
            tokio::select! {
                joined = &mut running => Some(joined),
                () = pool.worker().pending.wait_until_drained() => None,
            }
        })
        .await;

        let joined = match finished {
            // The pool only stops by itself on a fatal error
            Ok(Some(joined)) => joined,
            Ok(None) => {
                debug!("No pending work left, stopping workers");
                pool.stop_and_wait().await;
                running.await
            }
            Err(_) => {
                warn!(max_time = ?config.max_time, "Crawl deadline reached, draining in-flight work");
                let joined = loop {
                    pool.stop_and_wait().await;
                    // stop() is a no-op until start() has marked the pool Running
                    if let Ok(joined) = tokio::time::timeout(config.idle_interval, &mut running).await {
                        break joined;
                    }
                };
                // A fatal error that raced the deadline is reported instead
                joined??;
                return Err(CrawlError::DeadlineExceeded(config.max_time));
            }
        };
        joined??;

        let summary = pool.worker().summary();
        info!(
            fetched = summary.pages_fetched,
            skipped = summary.pages_skipped,
            seen = summary.urls_seen,
            "Crawl finished"
        );
        Ok(summary)
    }
}

async fn fetch_robots<F: Fetch>(fetcher: &F, config: &CrawlConfig) -> Result<RobotsPolicy, CrawlError> {
    match tokio::time::timeout(config.fetch_timeout, robots::acquire(fetcher, &config.root)).await {
        Ok(result) => result.map_err(CrawlError::Robots),
        Err(_) => Err(CrawlError::Robots(FetchError::Timeout)),
    }
}

// The unit of work every pool worker runs.
struct CrawlStep<F: Fetch> {
    fetcher: Arc<F>,
    sitemap: Arc<Sitemap>,
    links: LinkPolicy,
    robots: RobotsPolicy,
    user_agent: String,
    fetch_timeout: Duration,
    idle_interval: Duration,
    max_depth: Option<usize>,
    frontier: Frontier,
    pending: PendingWork,
    fetched: AtomicUsize,
    skipped: AtomicUsize,
}

impl<F: Fetch> CrawlStep<F> {
    fn summary(&self) -> CrawlSummary {
        CrawlSummary {
            pages_fetched: self.fetched.load(Ordering::Relaxed),
            pages_skipped: self.skipped.load(Ordering::Relaxed),
            urls_seen: self.frontier.seen_count(),
        }
    }

    async fn crawl(&self, queued: &Queued) -> Result<(), CrawlError> {
        let url = &queued.url;
        if !self.robots.allows(&self.user_agent, url) {
            info!(url = %url, "Skipping URL disallowed by robots.txt");
            self.skipped.fetch_add(1, Ordering::Relaxed);
            return Ok(());
        }

        let fetched = match tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout),
        };
        let body = match fetched {
            Ok(body) => body,
            Err(source @ (FetchError::OffsiteRedirect { .. } | FetchError::TooLarge { .. })) => {
                self.skipped.fetch_add(1, Ordering::Relaxed);
                return Err(CrawlError::PageSkipped {
                    url: url.clone(),
                    source,
                });
            }
            Err(source) => {
                return Err(CrawlError::Fetch {
                    url: url.clone(),
                    source,
                })
            }
        };
        self.fetched.fetch_add(1, Ordering::Relaxed);

        let found = extract(&body);
        let internal = links::internal_links(&found.links, url, &self.links);

        // Links on the last allowed level are reported but not followed
        let follow = self.max_depth.map_or(true, |max| queued.depth < max);
        let mut admitted = 0;
        for link in internal.iter().filter(|_| follow) {
            if self.frontier.seen(link) {
                continue;
            }
            // Counted before it can be popped, so nobody can finish it first
            self.pending.add(1);
            if self.frontier.admit_new(link.clone(), queued.depth + 1) {
                admitted += 1;
            } else {
                self.pending.done();
            }
        }

        debug!(
            url = %url,
            depth = queued.depth,
            links = internal.len(),
            admitted,
            assets = found.assets.len(),
            "Processed page"
        );
        self.sitemap.record(url, &internal, found.assets);
        Ok(())
    }
}

#[async_trait]
impl<F: Fetch> Worker for CrawlStep<F> {
    type Error = CrawlError;

    async fn work(&self) -> Outcome<CrawlError> {
        if !self.frontier.has_pending() {
            // Nothing to do yet. Wait for an admit, but not for long.
            let _ = tokio::time::timeout(self.idle_interval, self.frontier.wait_for_admit()).await;
            return Outcome::Success;
        }
        // Another worker may have taken it in the meantime
        let Some(queued) = self.frontier.next() else {
            return Outcome::Success;
        };

        let result = self.crawl(&queued).await;
        // Only after every link found on this page has been counted
        self.pending.done();
        match result {
            Err(e) if e.is_recoverable() => Outcome::Retry(e),
            other => other.into(),
        }
    }
}
