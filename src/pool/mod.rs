// src/pool/mod.rs
// =============================================================================
// A generic bounded-parallelism worker pool.
//
// Submodules:
// - worker: the Worker trait and the Outcome it returns
// - worker_pool: the pool itself (token supply, coordinator, drain)
// =============================================================================

mod worker;
mod worker_pool;

pub use worker::{Outcome, Worker};
pub use worker_pool::{PoolError, WorkerPool};
