//! Worker pool with dedicated worker threads.
//!
//! This module provides the default [`Executor`](crate::core::Executor) engine: a
//! fixed set of named OS threads fed from a channel. The channel is unbounded unless
//! `max_queue_depth` is set. Submission never blocks; a full bounded queue is
//! reported back to the caller instead.
//!
//! # Key Features
//!
//! - **Non-blocking submit**: a bounded pool fails fast with `QueueFull` rather than waiting
//! - **Panic isolation**: a panicking job is logged and counted, the worker keeps running
//! - **Graceful shutdown**: queued jobs are drained before workers exit
//!
//! # Example
//!
//! ```rust
//! use prometheus_work_adapter::config::WorkerPoolConfig;
//! use prometheus_work_adapter::core::{Executor, Job, WorkerPool};
//!
//! let pool = WorkerPool::new(
//!     WorkerPoolConfig::new()
//!         .with_worker_count(2)
//!         .with_max_queue_depth(16),
//! )?;
//!
//! pool.execute(Job::new(|| println!("hello from a worker"))).unwrap();
//! pool.shutdown();
//! # Ok::<(), prometheus_work_adapter::core::PoolError>(())
//! ```

// Platform-specific implementations
#[cfg(not(target_arch = "wasm32"))]
mod native;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Errors that can occur when handing work to a worker engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// The job queue is full; no more jobs can be accepted right now.
    QueueFull,

    /// The pool has been shut down.
    PoolShutdown,

    /// The engine accepted the job but dropped it without running it.
    Abandoned,

    /// Configuration validation failed.
    InvalidConfig(String),

    /// Internal error (worker thread could not be spawned, etc.).
    Internal(String),
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueueFull => write!(f, "job queue is full"),
            Self::PoolShutdown => write!(f, "pool has been shut down"),
            Self::Abandoned => write!(f, "job was dropped before it ran"),
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            Self::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for PoolError {}

/// Statistics about pool utilization.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Number of worker threads.
    pub worker_count: usize,

    /// Currently executing jobs.
    pub active_jobs: u64,

    /// Jobs waiting in the queue.
    pub queued_jobs: u64,

    /// Total jobs that ran to completion (including ones that panicked).
    pub completed_jobs: u64,

    /// Total jobs that panicked inside a worker.
    pub panicked_jobs: u64,

    /// Total jobs accepted.
    pub submitted_jobs: u64,

    /// Total jobs refused (queue full or shut down).
    pub rejected_jobs: u64,
}

/// Internal counters for pool statistics (thread-safe).
#[derive(Debug, Default)]
pub(crate) struct PoolCounters {
    pub active_jobs: AtomicU64,
    pub queued_jobs: AtomicU64,
    pub completed_jobs: AtomicU64,
    pub panicked_jobs: AtomicU64,
    pub submitted_jobs: AtomicU64,
    pub rejected_jobs: AtomicU64,
}

impl PoolCounters {
    /// Get a snapshot of current statistics.
    pub fn snapshot(&self, worker_count: usize) -> PoolStats {
        PoolStats {
            worker_count,
            active_jobs: self.active_jobs.load(Ordering::Relaxed),
            queued_jobs: self.queued_jobs.load(Ordering::Relaxed),
            completed_jobs: self.completed_jobs.load(Ordering::Relaxed),
            panicked_jobs: self.panicked_jobs.load(Ordering::Relaxed),
            submitted_jobs: self.submitted_jobs.load(Ordering::Relaxed),
            rejected_jobs: self.rejected_jobs.load(Ordering::Relaxed),
        }
    }
}

// Re-export the platform-specific WorkerPool implementation
#[cfg(not(target_arch = "wasm32"))]
pub use native::WorkerPool;
