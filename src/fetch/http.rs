// src/fetch/http.rs
// =============================================================================
// Fetches pages over HTTP with reqwest.
//
// Key functionality:
// - GET with a configurable User-Agent and per-request timeout
// - Only 200 OK counts as success; any other status comes back as
//   FetchError::Status carrying the code
// - Redirects are followed only while they stay on the site; a hop to
//   another host stops and comes back as FetchError::OffsiteRedirect
// - Bodies larger than max_body are refused, before or while reading
// - reqwest failures are sorted into timeout / connect / other
// =============================================================================

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use super::Fetch;

const MAX_REDIRECTS: usize = 5;
const DEFAULT_MAX_BODY: usize = 10 * 1024 * 1024;

/// Why a fetch failed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered, but not with 200 OK
    #[error("http response error: {}", .0.as_u16())]
    Status(StatusCode),

    /// A redirect pointed off the site and was not followed
    #[error("redirected off-site to {location}")]
    OffsiteRedirect { status: StatusCode, location: String },

    #[error("response body larger than {limit} bytes")]
    TooLarge { limit: usize },

    #[error("request timed out")]
    Timeout,

    #[error("could not connect: {0}")]
    Connect(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// The HTTP status, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Status(status) | FetchError::OffsiteRedirect { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// Timeouts and connection failures get their own variants, everything else
// is Transport.
impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout
        } else if error.is_connect() {
            FetchError::Connect(error)
        } else {
            FetchError::Transport(error)
        }
    }
}

/// The real network client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_body: usize,
}

impl HttpFetcher {
    /// `same_site` decides which redirect targets may be followed.
    pub fn new<S>(user_agent: &str, timeout: Duration, same_site: S) -> Result<Self, FetchError>
    where
        S: Fn(&Url) -> bool + Send + Sync + 'static,
    {
        let redirects = Policy::custom(move |attempt| {
            if attempt.previous().len() >= MAX_REDIRECTS {
                attempt.error("too many redirects")
            } else if same_site(attempt.url()) {
                attempt.follow()
            } else {
                // Hands the 3xx response back to fetch()
                attempt.stop()
            }
        });

        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(redirects)
            .build()?;
        Ok(Self {
            client,
            max_body: DEFAULT_MAX_BODY,
        })
    }

    #[cfg(test)]
    fn with_max_body(mut self, max_body: usize) -> Self {
        self.max_body = max_body;
        self
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<Bytes, FetchError> {
        info!(url = %url, "Fetching URL");
        let mut response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if status.is_redirection() {
            if let Some(location) = response.headers().get(LOCATION) {
                let location = String::from_utf8_lossy(location.as_bytes()).into_owned();
                debug!(url = %url, location = %location, "Not following off-site redirect");
                return Err(FetchError::OffsiteRedirect { status, location });
            }
        }
        if status != StatusCode::OK {
            debug!(url = %url, status = status.as_u16(), "Unexpected status");
            return Err(FetchError::Status(status));
        }

        let limit = self.max_body;
        if response.content_length().is_some_and(|len| len > limit as u64) {
            return Err(FetchError::TooLarge { limit });
        }
        // Content-Length can be missing or wrong, so count while reading too
        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > limit {
                return Err(FetchError::TooLarge { limit });
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body.freeze())
    }
}
