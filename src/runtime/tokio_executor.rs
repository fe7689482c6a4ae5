//! Tokio runtime executor implementation.

use std::sync::Arc;

use crate::core::{Executor, Job, Rejection};

/// Tokio-based executor that runs jobs on a runtime's blocking thread pool.
///
/// Jobs are synchronous, so they go through `spawn_blocking` and never stall the
/// runtime's async workers.
#[derive(Clone)]
pub struct TokioExecutor {
    handle: Arc<tokio::runtime::Handle>,
}

impl TokioExecutor {
    /// Create a new `TokioExecutor` from a tokio runtime handle.
    #[must_use]
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self {
            handle: Arc::new(handle),
        }
    }

    /// Executor for the runtime the caller is currently running in.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    #[must_use]
    pub fn current() -> Self {
        Self::new(tokio::runtime::Handle::current())
    }
}

impl Executor for TokioExecutor {
    fn execute(&self, job: Job) -> Result<(), Rejection> {
        // The JoinHandle is dropped; completion is reported by the job itself
        drop(self.handle.spawn_blocking(move || job.run()));
        Ok(())
    }
}

impl std::fmt::Debug for TokioExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioExecutor").finish_non_exhaustive()
    }
}
