// src/pool/worker_pool.rs
// =============================================================================
// A start/stoppable pool of workers.
//
// Work is not delivered to the pool. Instead, a worker claims a token, runs
// its own unit of work, and reports back. The coordinator (the task that
// called start()) hands out one new token per reported result, so at most
// `num_workers` units of work are ever in flight.
//
// Moving parts:
// - tokens:  a Semaphore with no initial permits; start() adds one per worker,
//            the coordinator adds one per result, close() ends the supply
// - results: bounded mpsc channel, one message per finished unit of work
// - halts:   unbounded mpsc channel carrying a fatal error or a stop request
// - workers: a JoinSet, awaited when draining
// - state:   a watch channel so stop_and_wait() can block until Stopped
// =============================================================================

use parking_lot::Mutex;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use super::worker::{Outcome, Worker};

/// Lifecycle of a pool: `Stopped -> Running -> Stopping -> Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    Stopped,
    Running,
    Stopping,
}

/// Errors returned from [`WorkerPool::start`].
#[derive(Debug, Error)]
pub enum PoolError<E>
where
    E: std::error::Error + 'static,
{
    #[error("worker pool is already running")]
    AlreadyRunning,

    /// A worker returned a fatal outcome.
    #[error(transparent)]
    Worker(E),
}

// What the coordinator reacts to when it stops. An external stop() and a
// worker's fatal error travel down the same channel.
enum Halt<E> {
    Stopped,
    Failed(E),
}

pub struct WorkerPool<W: Worker> {
    worker: Arc<W>,
    num_workers: usize,
    state: watch::Sender<PoolState>,
    halts: Mutex<Option<mpsc::UnboundedSender<Halt<W::Error>>>>,
}

impl<W: Worker> WorkerPool<W> {
    /// Creates a stopped pool. A pool always runs at least one worker.
    pub fn new(worker: W, num_workers: usize) -> Self {
        let (state, _) = watch::channel(PoolState::Stopped);
        Self {
            worker: Arc::new(worker),
            num_workers: num_workers.max(1),
            state,
            halts: Mutex::new(None),
        }
    }

    pub fn state(&self) -> PoolState {
        *self.state.borrow()
    }

    pub fn worker(&self) -> &W {
        &self.worker
    }

    /// Runs the pool until it is stopped or a worker fails.
    ///
    /// Returns `Ok(())` when stopped through [`stop`](Self::stop), and the
    /// worker's error when a fatal outcome brought the pool down. In both
    /// cases every worker has exited by the time this returns.
    pub async fn start(&self) -> Result<(), PoolError<W::Error>> {
        let tokens = Arc::new(Semaphore::new(0));
        let (result_tx, mut result_rx) = mpsc::channel::<()>(self.num_workers);
        let (halt_tx, mut halt_rx) = mpsc::unbounded_channel();

        // The halt sender must be in place before anyone can observe Running.
        {
            let mut halts = self.halts.lock();
            let entered = self.state.send_if_modified(|state| {
                if *state == PoolState::Stopped {
                    *state = PoolState::Running;
                    true
                } else {
                    false
                }
            });
            if !entered {
                return Err(PoolError::AlreadyRunning);
            }
            *halts = Some(halt_tx.clone());
        }

        let mut workers = JoinSet::new();
        for id in 0..self.num_workers {
            debug!(worker = id, "Creating worker");
            tokens.add_permits(1);
            workers.spawn(run_worker(
                id,
                Arc::clone(&self.worker),
                Arc::clone(&tokens),
                result_tx.clone(),
                halt_tx.clone(),
            ));
        }
        drop(result_tx);
        drop(halt_tx);

        let halt = loop {
            tokio::select! {
                biased;

                Some(halt) = halt_rx.recv() => break halt,
                Some(()) = result_rx.recv() => {
                    debug!("Got result, adding token");
                    tokens.add_permits(1);
                }
                else => break Halt::Stopped,
            }
        };

        self.state.send_replace(PoolState::Stopping);
        match &halt {
            Halt::Stopped => info!("Worker pool stopping on request"),
            Halt::Failed(err) => error!(error = %err, "Got fatal error from worker, stopping pool"),
        }

        // Workers waiting on a token wake up with an error and exit; workers
        // mid-task exit after finishing it.
        tokens.close();
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Worker task did not exit cleanly");
            }
        }

        // Anything still queued came from workers that were already draining.
        self.halts.lock().take();
        while let Ok(extra) = halt_rx.try_recv() {
            if let Halt::Failed(err) = extra {
                warn!(error = %err, "Discarding error from draining worker");
            }
        }

        self.state.send_replace(PoolState::Stopped);
        debug!("Worker pool stopped");

        match halt {
            Halt::Stopped => Ok(()),
            Halt::Failed(err) => Err(PoolError::Worker(err)),
        }
    }

    /// Asks a running pool to stop. Does nothing if it is not running.
    pub fn stop(&self) {
        if self.state() != PoolState::Running {
            return;
        }
        if let Some(halts) = self.halts.lock().as_ref() {
            info!("Stopping worker pool");
            let _ = halts.send(Halt::Stopped);
        }
    }

    /// Stops the pool and waits until every worker has exited.
    ///
    /// Only useful while `start()` is being driven by another task.
    pub async fn stop_and_wait(&self) {
        let mut state = self.state.subscribe();
        self.stop();
        // The sender lives in self, so wait_for cannot see a closed channel.
        let _ = state.wait_for(|s| *s == PoolState::Stopped).await;
    }
}

// One worker: claim a token, run the unit of work, report, repeat.
async fn run_worker<W: Worker>(
    id: usize,
    worker: Arc<W>,
    tokens: Arc<Semaphore>,
    results: mpsc::Sender<()>,
    halts: mpsc::UnboundedSender<Halt<W::Error>>,
) {
    // acquire() fails once the supply is closed
    while let Ok(permit) = tokens.acquire().await {
        permit.forget();
        debug!(worker = id, "Processing job");

        match worker.work().await {
            Outcome::Success => {}
            Outcome::Retry(err) => {
                info!(worker = id, error = %err, "Got retryable error, continuing");
            }
            Outcome::Fatal(err) => {
                let _ = halts.send(Halt::Failed(err));
                break;
            }
        }

        if results.send(()).await.is_err() {
            break;
        }
    }
    debug!(worker = id, "Worker exited");
}
