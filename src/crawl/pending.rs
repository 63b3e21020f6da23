// src/crawl/pending.rs
// =============================================================================
// Counts units of crawl work that have been admitted but not yet finished.
//
// - add(n):  called when URLs are admitted to the frontier (root included)
// - done():  called once per popped URL, after every add() for links found
//            on that page has already happened
// - wait_until_drained(): resolves when the count is zero
//
// Because a page's discoveries are counted before the page itself is marked
// done, zero is only ever reached when the whole crawl has run dry.
// =============================================================================

use tokio::sync::watch;
use tracing::error;

#[derive(Debug)]
pub struct PendingWork {
    count: watch::Sender<usize>,
}

impl Default for PendingWork {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingWork {
    pub fn new() -> Self {
        let (count, _) = watch::channel(0);
        Self { count }
    }

    pub fn add(&self, n: usize) {
        if n > 0 {
            self.count.send_modify(|count| *count += n);
        }
    }

    pub fn done(&self) {
        self.count.send_modify(|count| {
            if *count == 0 {
                error!("Pending work counter would go negative; leaving it at zero");
            } else {
                *count -= 1;
            }
        });
    }

    #[cfg(test)]
    pub fn get(&self) -> usize {
        *self.count.borrow()
    }

    /// Waits until no work is outstanding. Returns immediately at zero.
    pub async fn wait_until_drained(&self) {
        let mut count = self.count.subscribe();
        // self owns the sender, so the channel stays open for the wait
        let _ = count.wait_for(|n| *n == 0).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_add_and_done() {
        let pending = PendingWork::new();
        pending.add(3);
        pending.done();
        assert_eq!(pending.get(), 2);
    }

    #[test]
    fn test_done_never_goes_below_zero() {
        let pending = PendingWork::new();
        pending.done();
        assert_eq!(pending.get(), 0);
    }

    #[tokio::test]
    async fn test_wait_returns_once_drained() {
        let pending = Arc::new(PendingWork::new());
        pending.add(2);

        let waiter = tokio::spawn({
            let pending = Arc::clone(&pending);
            async move { pending.wait_until_drained().await }
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        pending.done();
        // A page that discovers a link adds before it finishes
        pending.add(1);
        pending.done();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        pending.done();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should finish at zero")
            .unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_producers_never_hit_zero_early() {
        let pending = Arc::new(PendingWork::new());
        let finished = Arc::new(AtomicBool::new(false));
        pending.add(1);

        let mut observer = pending.count.subscribe();
        let watcher = tokio::spawn({
            let finished = Arc::clone(&finished);
            async move {
                while observer.changed().await.is_ok() {
                    if *observer.borrow_and_update() == 0 {
                        return finished.load(Ordering::SeqCst);
                    }
                }
                false
            }
        });

        // Four pages, each discovering two more before finishing
        let mut tasks = Vec::new();
        for _ in 0..4 {
            let pending = Arc::clone(&pending);
            pending.add(1);
            tasks.push(tokio::spawn(async move {
                for _ in 0..2 {
                    pending.add(1);
                    tokio::task::yield_now().await;
                    pending.done();
                }
                pending.done();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(pending.get(), 1);

        finished.store(true, Ordering::SeqCst);
        pending.done();
        assert!(watcher.await.unwrap(), "counter reached zero before the root finished");
    }
}
