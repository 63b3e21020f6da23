// src/crawl/links.rs
// =============================================================================
// Link policy: which discovered links belong to the site, and what their
// absolute address is.
//
// How a raw href becomes a crawl candidate:
// 1. Parse it. Absolute URLs parse on their own; anything without a scheme is
//    relative. Strings that are neither get logged and dropped.
// 2. Resolve it against the base (the crawl root, or the page it was found
//    on when `resolve_against_page` is set). The fragment is stripped so
//    `/a#top` and `/a` are the same page.
// 3. Keep it if its host is the root host (or a subdomain of it, when
//    following subdomains).
// =============================================================================

use std::collections::HashSet;
use tracing::debug;
use url::{ParseError, Url};

use crate::config::CrawlConfig;

/// A discovered link after parsing, before resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Candidate {
    Absolute(Url),
    Relative(String),
}

impl Candidate {
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let raw = raw.trim();
        match Url::parse(raw) {
            Ok(url) => Ok(Candidate::Absolute(url)),
            Err(ParseError::RelativeUrlWithoutBase) => Ok(Candidate::Relative(raw.to_string())),
            Err(e) => Err(e),
        }
    }
}

/// The per-run parts of the crawl policy that link filtering needs.
#[derive(Debug, Clone)]
pub struct LinkPolicy {
    pub root: Url,
    pub root_host: String,
    pub follow_subdomains: bool,
    pub resolve_against_page: bool,
}

impl LinkPolicy {
    pub fn from_config(config: &CrawlConfig) -> Self {
        Self {
            root: config.root.clone(),
            root_host: config.root_host.clone(),
            follow_subdomains: config.follow_subdomains,
            resolve_against_page: config.resolve_against_page,
        }
    }

    /// Whether an absolute URL's host belongs to the site.
    pub fn is_internal_url(&self, url: &Url) -> bool {
        host_is_internal(url, &self.root_host, self.follow_subdomains)
    }

    /// The URL relative links found on `page` resolve against.
    pub fn base_for<'a>(&'a self, page: &'a Url) -> &'a Url {
        if self.resolve_against_page {
            page
        } else {
            &self.root
        }
    }
}

/// Relative links are always internal. Absolute ones are internal when their
/// host is the root host, or ends in `.<root host>` when following subdomains.
pub fn is_internal(candidate: &Candidate, root_host: &str, follow_subdomains: bool) -> bool {
    match candidate {
        Candidate::Relative(_) => true,
        Candidate::Absolute(url) => host_is_internal(url, root_host, follow_subdomains),
    }
}

fn host_is_internal(url: &Url, root_host: &str, follow_subdomains: bool) -> bool {
    let Some(host) = url.host_str() else {
        // mailto:, data:, javascript: and friends
        return false;
    };
    if host.eq_ignore_ascii_case(root_host) {
        return true;
    }
    // Anchored at a label boundary: blog.example.com matches, notexample.com doesn't
    follow_subdomains
        && host.len() > root_host.len()
        && host.to_ascii_lowercase().ends_with(&format!(".{}", root_host.to_ascii_lowercase()))
}

/// Resolves the candidate against `base`, dropping any fragment.
pub fn resolve(base: &Url, candidate: &Candidate) -> Result<Url, ParseError> {
    let mut url = match candidate {
        Candidate::Absolute(url) => url.clone(),
        Candidate::Relative(raw) => base.join(raw)?,
    };
    url.set_fragment(None);
    Ok(url)
}

/// Parses, resolves and filters the links found on one page.
///
/// Returns the page's internal links in document order, without duplicates.
/// Whether they have been seen before is the caller's business.
pub fn internal_links(raw_links: &[String], page: &Url, policy: &LinkPolicy) -> Vec<Url> {
    let base = policy.base_for(page);
    let mut links: Vec<Url> = Vec::new();
    let mut kept: HashSet<String> = HashSet::new();

    for raw in raw_links {
        let candidate = match Candidate::parse(raw) {
            Ok(candidate) => candidate,
            Err(e) => {
                debug!(link = %raw, error = %e, "Dropping unparsable link");
                continue;
            }
        };
        if !is_internal(&candidate, &policy.root_host, policy.follow_subdomains) {
            continue;
        }
        let resolved = match resolve(base, &candidate) {
            Ok(url) => url,
            Err(e) => {
                debug!(link = %raw, error = %e, "Dropping unresolvable link");
                continue;
            }
        };
        // "//other.host/x" parses as relative but resolves off-site
        if !policy.is_internal_url(&resolved) {
            continue;
        }
        if !matches!(resolved.scheme(), "http" | "https") {
            continue;
        }
        if kept.insert(resolved.as_str().to_owned()) {
            links.push(resolved);
        }
    }

    links
}
