//! # Prometheus Work Adapter
//!
//! A parameterized worker execution adapter for the Prometheus AI Platform.
//!
//! Callers describe work as a *task type* plus a *parameter value*. The adapter builds
//! the task, runs it on a shared worker engine, and on the next synchronization point
//! blocks until everything submitted has finished, returning every individual failure
//! as one ordered [`AggregateError`](core::AggregateError).
//!
//! ## Core Problem Solved
//!
//! Fanning out many small jobs is easy; finding out what went wrong is not:
//!
//! - **No per-type glue**: a task type opts in by implementing `FromParameter<P>`
//! - **No per-call checks**: `submit` never fails; problems surface on drain
//! - **No lost errors**: construction, scheduling and execution failures are all
//!   collected in the order they completed
//! - **No leaked work**: dropping or closing the adapter waits for outstanding tasks
//!
//! ## Example
//!
//! ```rust
//! use prometheus_work_adapter::builders::AdapterBuilder;
//! use prometheus_work_adapter::config::WorkerPoolConfig;
//! use prometheus_work_adapter::core::{AppResult, FailureKind, FromParameter, WorkTask};
//!
//! struct Validate {
//!     left: String,
//!     right: String,
//! }
//!
//! impl FromParameter<(String, String)> for Validate {
//!     fn from_parameter((left, right): (String, String)) -> AppResult<Self> {
//!         Ok(Self { left, right })
//!     }
//! }
//!
//! impl WorkTask for Validate {
//!     fn run(&mut self) -> AppResult<()> {
//!         anyhow::ensure!(self.left == self.right, "wrong parameters value");
//!         Ok(())
//!     }
//! }
//!
//! let adapter = AdapterBuilder::new()
//!     .config(WorkerPoolConfig::new().with_worker_count(4))
//!     .build()?;
//!
//! adapter.submit::<Validate, _>(("a".to_string(), "a".to_string()));
//! adapter.submit::<Validate, _>(("a".to_string(), "b".to_string()));
//!
//! let failures = adapter.close().unwrap_err();
//! assert_eq!(failures.len(), 1);
//! assert_eq!(failures.primary().kind(), FailureKind::ExecutionFailure);
//! # Ok::<(), prometheus_work_adapter::core::PoolError>(())
//! ```
//!
//! For complete examples, see `tests/adapter_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Tasks, construction, execution, worker engines and the work adapter.
pub mod core;
/// Configuration models for worker pools.
pub mod config;
/// Builders to construct adapters from configuration.
pub mod builders;
/// Runtime adapters for alternative worker engines.
pub mod runtime;
/// Shared utilities.
pub mod util;
