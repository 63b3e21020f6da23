// src/crawl/frontier.rs
// =============================================================================
// The frontier: URLs waiting to be fetched, plus every URL ever admitted.
//
// How it works:
// 1. admit() pushes a URL onto the pending stack and records it as seen
// 2. next() pops the most recently admitted URL (last-in, first-out)
// 3. seen() answers "has this URL ever been admitted?"
//
// Every pending URL carries its depth: how many links were followed from the
// root to reach it. The root is depth 0.
//
// The pending stack and the seen-set sit behind ONE lock, so no caller can
// observe a URL that is pending but not yet seen (or the other way round).
// Admitting also wakes any worker parked in wait_for_admit().
//
// Rust concepts:
// - parking_lot::Mutex: a lock that cannot be poisoned
// - tokio::sync::Notify: wakes async tasks without holding a lock
// =============================================================================

use parking_lot::Mutex;
use std::collections::HashSet;
use tokio::sync::Notify;
use url::Url;

/// Something that can tell whether a URL has been seen before.
pub trait Seen {
    fn seen(&self, url: &Url) -> bool;
}

/// A URL waiting to be crawled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Queued {
    pub url: Url,
    pub depth: usize,
}

#[derive(Debug, Default)]
struct Inner {
    pending: Vec<Queued>,
    // Keyed by the full string form of the URL
    seen: HashSet<String>,
}

#[derive(Debug, Default)]
pub struct Frontier {
    inner: Mutex<Inner>,
    admitted: Notify,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if something is waiting. May be stale as soon as it returns.
    pub fn has_pending(&self) -> bool {
        !self.inner.lock().pending.is_empty()
    }

    /// Pops the most recently admitted URL, or None if nothing is pending.
    pub fn next(&self) -> Option<Queued> {
        self.inner.lock().pending.pop()
    }

    /// Pushes a URL and marks it seen.
    ///
    /// Does not check for duplicates; callers consult seen() first, or use
    /// admit_new() when several tasks may discover the same URL at once.
    pub fn admit(&self, url: Url, depth: usize) {
        {
            let mut inner = self.inner.lock();
            inner.seen.insert(url.as_str().to_owned());
            inner.pending.push(Queued { url, depth });
        }
        self.admitted.notify_waiters();
    }

    /// Admits the URL only if it has never been seen. Returns whether it was
    /// admitted. The check and the push happen under the same lock.
    pub fn admit_new(&self, url: Url, depth: usize) -> bool {
        {
            let mut inner = self.inner.lock();
            if !inner.seen.insert(url.as_str().to_owned()) {
                return false;
            }
            inner.pending.push(Queued { url, depth });
        }
        self.admitted.notify_waiters();
        true
    }

    pub fn seen_count(&self) -> usize {
        self.inner.lock().seen.len()
    }

    /// Resolves the next time a URL is admitted.
    pub async fn wait_for_admit(&self) {
        self.admitted.notified().await;
    }
}

impl Seen for Frontier {
    fn seen(&self, url: &Url) -> bool {
        self.inner.lock().seen.contains(url.as_str())
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a Vec and not a VecDeque?
//    - We only ever push and pop at the END, which is exactly what Vec does
//    - That makes the crawl depth-first: the newest link is visited next
//
// 2. Why does seen() live in a trait?
//    - The crawl step only needs "was this seen?", not the whole frontier
//    - `use super::Seen` brings the method into scope where it is called
//
// 3. Why drop the lock before notify_waiters()?
//    - The inner block `{ ... }` ends the MutexGuard's lifetime
//    - Woken workers immediately call next(), which needs the lock
// -----------------------------------------------------------------------------
