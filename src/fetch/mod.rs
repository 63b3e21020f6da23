// src/fetch/mod.rs
// =============================================================================
// Getting page bodies off the network.
//
// The crawl engine only depends on the Fetch trait, so tests can swap in a
// fake site. HttpFetcher is the reqwest-backed implementation.
// =============================================================================

mod http;

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

pub use http::{FetchError, HttpFetcher};

#[async_trait]
pub trait Fetch: Send + Sync + 'static {
    /// Fetches the body at `url`. Dropping the future cancels the request.
    async fn fetch(&self, url: &Url) -> Result<Bytes, FetchError>;
}
