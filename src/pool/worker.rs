// src/pool/worker.rs
// =============================================================================
// The unit of work a pool runs, and the outcome it reports back.
//
// The pool never looks inside an error to decide what to do with it. The
// code that produced the error picks the Outcome variant:
// - Success: keep going
// - Retry:   log it, then keep going as if it succeeded
// - Fatal:   stop the whole pool and hand the error to whoever called start()
// =============================================================================

use async_trait::async_trait;

/// Result of one call to [`Worker::work`].
#[derive(Debug)]
pub enum Outcome<E> {
    /// The unit of work finished (or had nothing to do).
    Success,
    /// Something went wrong, but the pool should carry on.
    Retry(E),
    /// Something went wrong and the pool must stop.
    Fatal(E),
}

// Plain results map Err to Fatal. Code that wants Retry has to say so.
impl<E> From<Result<(), E>> for Outcome<E> {
    fn from(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Outcome::Success,
            Err(e) => Outcome::Fatal(e),
        }
    }
}

/// Anything that can be run repeatedly by a [`WorkerPool`](super::WorkerPool).
///
/// The worker decides for itself what to work on; the pool only hands out
/// permission to run.
#[async_trait]
pub trait Worker: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn work(&self) -> Outcome<Self::Error>;
}
