//! Native implementation of `WorkerPool` using OS threads.
//!
//! Each worker blocks on a shared crossbeam receiver and runs jobs to completion.
//!
//! # Design Principles
//!
//! - **No polling**: workers sleep in `recv()` until work arrives
//! - **Clean shutdown**: dropping the sender lets workers drain the queue and exit
//! - **Lock-free counters**: statistics are plain atomics

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::WorkerPoolConfig;
use crate::core::executor::{Executor, Job, Rejection};
use crate::util::panic::panic_message;

use super::{PoolCounters, PoolError, PoolStats};

/// How long `shutdown` waits for each worker before detaching it.
const WORKER_JOIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Worker pool with dedicated OS threads.
///
/// # Design
///
/// - **Optional bound**: unbounded by default; with `max_queue_depth` set, `execute`
///   rejects once that many jobs are waiting
/// - **Clean shutdown**: dropping the sender naturally unblocks all workers
/// - **Lock-free fast path**: atomic counters, a brief lock only around the sender
pub struct WorkerPool {
    /// Pool configuration.
    config: WorkerPoolConfig,

    /// Job sender (to workers). Option allows clean shutdown by dropping.
    job_tx: Mutex<Option<Sender<Job>>>,

    /// Pool statistics counters (lock-free atomics).
    counters: Arc<PoolCounters>,

    /// Shutdown flag (lock-free atomic).
    shutdown: AtomicBool,

    /// Worker thread handles.
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    /// Create a new worker pool with the given configuration.
    ///
    /// This spawns `config.worker_count` OS threads.
    ///
    /// # Errors
    ///
    /// - `PoolError::InvalidConfig` if the configuration is invalid
    /// - `PoolError::Internal` if a worker thread cannot be spawned
    pub fn new(config: WorkerPoolConfig) -> Result<Self, PoolError> {
        config.validate().map_err(PoolError::InvalidConfig)?;

        let (job_tx, job_rx) = match config.max_queue_depth {
            Some(depth) => bounded::<Job>(depth),
            None => unbounded::<Job>(),
        };
        let counters = Arc::new(PoolCounters::default());

        let mut workers = Vec::with_capacity(config.worker_count);
        for worker_id in 0..config.worker_count {
            let spawned = spawn_worker(
                worker_id,
                &config,
                job_rx.clone(),
                Arc::clone(&counters),
            );
            match spawned {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    // Workers already running exit once the sender is dropped
                    drop(job_tx);
                    error!(worker_id = worker_id, error = %e, "Failed to spawn worker thread");
                    return Err(PoolError::Internal(format!(
                        "failed to spawn worker {worker_id}: {e}"
                    )));
                }
            }
        }

        info!(
            worker_count = config.worker_count,
            max_queue_depth = ?config.max_queue_depth,
            "WorkerPool initialized with dedicated OS threads"
        );

        Ok(Self {
            config,
            job_tx: Mutex::new(Some(job_tx)),
            counters,
            shutdown: AtomicBool::new(false),
            workers: Mutex::new(workers),
        })
    }

    /// Pool configuration.
    #[must_use]
    pub const fn config(&self) -> &WorkerPoolConfig {
        &self.config
    }

    /// Get current pool statistics.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.counters.snapshot(self.config.worker_count)
    }

    /// Whether `shutdown` has been called (or the pool dropped).
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Shut down the pool gracefully.
    ///
    /// New jobs are rejected immediately. Workers finish the jobs already queued, then
    /// exit; each is given a bounded time to join before it is detached.
    pub fn shutdown(&self) {
        if self.shutdown.swap(true, Ordering::AcqRel) {
            return;
        }

        info!("Shutting down worker pool");

        // Drop the sender so workers see a disconnected channel once it is empty
        {
            let mut job_tx = self.job_tx.lock();
            *job_tx = None;
        }

        let mut workers = self.workers.lock();
        let worker_count = workers.len();

        for (idx, worker) in workers.drain(..).enumerate() {
            let (tx, rx) = std::sync::mpsc::channel();
            let join_thread = thread::spawn(move || {
                let result = worker.join();
                let _ = tx.send(result.is_ok());
            });

            match rx.recv_timeout(WORKER_JOIN_TIMEOUT) {
                Ok(true) => {
                    debug!(worker_id = idx, "Worker joined successfully");
                }
                Ok(false) => {
                    warn!(worker_id = idx, "Worker panicked");
                }
                Err(_) => {
                    warn!(worker_id = idx, "Worker did not exit within timeout - detaching");
                    continue;
                }
            }

            let _ = join_thread.join();
        }

        info!(worker_count = worker_count, "Worker pool shut down complete");
    }
}

impl Executor for WorkerPool {
    fn execute(&self, job: Job) -> Result<(), Rejection> {
        if self.shutdown.load(Ordering::Acquire) {
            self.counters.rejected_jobs.fetch_add(1, Ordering::Relaxed);
            return Err(Rejection::new(PoolError::PoolShutdown, job));
        }

        let job_tx_guard = self.job_tx.lock();
        let Some(job_tx) = job_tx_guard.as_ref() else {
            self.counters.rejected_jobs.fetch_add(1, Ordering::Relaxed);
            return Err(Rejection::new(PoolError::PoolShutdown, job));
        };

        // Count before sending so a fast worker never decrements below zero
        self.counters.queued_jobs.fetch_add(1, Ordering::Relaxed);
        match job_tx.try_send(job) {
            Ok(()) => {
                self.counters.submitted_jobs.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(TrySendError::Full(job)) => {
                self.counters.queued_jobs.fetch_sub(1, Ordering::Relaxed);
                self.counters.rejected_jobs.fetch_add(1, Ordering::Relaxed);
                warn!(
                    max_queue_depth = ?self.config.max_queue_depth,
                    "Worker pool queue is full"
                );
                Err(Rejection::new(PoolError::QueueFull, job))
            }
            Err(TrySendError::Disconnected(job)) => {
                self.counters.queued_jobs.fetch_sub(1, Ordering::Relaxed);
                self.counters.rejected_jobs.fetch_add(1, Ordering::Relaxed);
                Err(Rejection::new(PoolError::PoolShutdown, job))
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Signal shutdown but don't join workers in Drop
        if !self.shutdown.swap(true, Ordering::AcqRel) {
            let mut job_tx = self.job_tx.lock();
            *job_tx = None;
            debug!("WorkerPool dropped without explicit shutdown - workers will be detached");
        }
    }
}

/// Spawn a worker thread.
fn spawn_worker(
    worker_id: usize,
    config: &WorkerPoolConfig,
    job_rx: Receiver<Job>,
    counters: Arc<PoolCounters>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(format!("{}-{worker_id}", config.thread_name_prefix))
        .stack_size(config.thread_stack_size)
        .spawn(move || {
            debug!(worker_id = worker_id, "Worker thread started");

            // When the sender is dropped and the queue is empty, recv returns Err
            while let Ok(job) = job_rx.recv() {
                counters.queued_jobs.fetch_sub(1, Ordering::Relaxed);
                counters.active_jobs.fetch_add(1, Ordering::Relaxed);

                if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| job.run())) {
                    counters.panicked_jobs.fetch_add(1, Ordering::Relaxed);
                    error!(
                        worker_id = worker_id,
                        panic = %panic_message(payload.as_ref()),
                        "Job panicked in worker"
                    );
                }

                counters.active_jobs.fetch_sub(1, Ordering::Relaxed);
                counters.completed_jobs.fetch_add(1, Ordering::Relaxed);
            }

            debug!(worker_id = worker_id, "Worker thread exiting");
        })
}
