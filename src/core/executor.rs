//! The worker-engine seam and job abstraction.
//!
//! The adapter never runs work itself; it hands [`Job`]s to an [`Executor`]. Any
//! engine that can run a zero-argument closure asynchronously fits behind this trait:
//! the crate ships a dedicated thread pool ([`crate::core::WorkerPool`]), an inline
//! executor for tests and single-threaded tools, and a tokio-backed executor.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use prometheus_work_adapter::core::{Executor, InlineExecutor, Job};
//!
//! let executor: Arc<dyn Executor> = Arc::new(InlineExecutor);
//! executor.execute(Job::new(|| println!("ran"))).unwrap();
//! ```

use std::fmt;

use super::worker_pool::PoolError;

/// A zero-argument unit of work accepted by an [`Executor`].
pub struct Job {
    work: Box<dyn FnOnce() + Send + 'static>,
}

impl Job {
    /// Wrap a closure as a job.
    pub fn new<F>(work: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            work: Box::new(work),
        }
    }

    /// Run the job on the current thread, consuming it.
    pub fn run(self) {
        (self.work)();
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job").finish_non_exhaustive()
    }
}

/// A job the executor refused, handed back together with the reason.
#[derive(Debug)]
pub struct Rejection {
    /// Why the job was refused.
    pub error: PoolError,
    /// The job, unrun.
    pub job: Job,
}

impl Rejection {
    /// Pair a refused job with its reason.
    #[must_use]
    pub const fn new(error: PoolError, job: Job) -> Self {
        Self { error, job }
    }
}

/// Engine that runs jobs, typically on other threads.
///
/// Implementations must either run every accepted job or drop it; a dropped job is
/// detected by the adapter and reported as a scheduling failure.
pub trait Executor: Send + Sync {
    /// Accept a job for execution. Must not block waiting for the job to finish.
    ///
    /// # Errors
    ///
    /// Returns the job inside a [`Rejection`] if it cannot be accepted.
    fn execute(&self, job: Job) -> Result<(), Rejection>;
}

/// Executor that runs each job to completion on the submitting thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn execute(&self, job: Job) -> Result<(), Rejection> {
        job.run();
        Ok(())
    }
}
