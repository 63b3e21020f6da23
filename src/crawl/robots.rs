// src/crawl/robots.rs
// =============================================================================
// Fetches the root's robots.txt once per run and answers "may we fetch this?"
//
// What the response status means:
//   200        -> parse the body as robots rules
//   other 2xx  -> no usable body, everything is allowed
//   4xx        -> no robots.txt, everything is allowed
//   5xx/other  -> the site is unwell, nothing is allowed
//                 (this includes a redirect off the site)
// A transport failure (DNS, refused connection, timeout) is returned as an
// error and aborts the run before any page is fetched.
// =============================================================================

use reqwest::StatusCode;
use robotstxt::DefaultMatcher;
use tracing::{info, warn};
use url::Url;

use crate::fetch::{Fetch, FetchError};

#[derive(Debug, Clone, PartialEq)]
pub enum RobotsPolicy {
    AllowAll,
    DenyAll,
    Rules(String),
}

impl RobotsPolicy {
    /// The policy implied by a non-200 robots.txt response.
    pub fn from_status(status: StatusCode) -> Self {
        if status.is_success() || status.is_client_error() {
            RobotsPolicy::AllowAll
        } else {
            RobotsPolicy::DenyAll
        }
    }

    pub fn allows(&self, user_agent: &str, url: &Url) -> bool {
        match self {
            RobotsPolicy::AllowAll => true,
            RobotsPolicy::DenyAll => false,
            RobotsPolicy::Rules(body) => {
                // robots.txt groups are keyed on the product token, "sitespider" in "sitespider/0.1.0"
                let agent = user_agent.split('/').next().unwrap_or(user_agent);
                DefaultMatcher::default().one_agent_allowed_by_robots(body, agent, url.as_str())
            }
        }
    }
}

pub fn robots_url(root: &Url) -> Result<Url, url::ParseError> {
    root.join("/robots.txt")
}

/// Fetches and interprets `<root>/robots.txt`.
pub async fn acquire<F: Fetch + ?Sized>(fetcher: &F, root: &Url) -> Result<RobotsPolicy, FetchError> {
    let url = robots_url(root).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

    match fetcher.fetch(&url).await {
        Ok(body) => {
            info!(url = %url, bytes = body.len(), "Loaded robots.txt");
            Ok(RobotsPolicy::Rules(String::from_utf8_lossy(&body).into_owned()))
        }
        Err(e) => {
            // Only an HTTP answer says anything about the policy
            let Some(status) = e.status() else {
                return Err(e);
            };
            let policy = RobotsPolicy::from_status(status);
            if policy == RobotsPolicy::DenyAll {
                warn!(url = %url, status = status.as_u16(), "robots.txt unavailable, treating site as disallowed");
            } else {
                info!(url = %url, status = status.as_u16(), "No robots.txt, crawling without restrictions");
            }
            Ok(policy)
        }
    }
}
