//! Core abstractions: tasks, construction, execution, and the work adapter.

pub mod adapter;
pub mod error;
pub mod executor;
pub mod factory;
pub mod runner;
pub mod task;
pub mod worker_pool;

pub use adapter::{AdapterStats, Phase, SubmissionId, WorkAdapter};
pub use error::{AggregateError, AppResult, Failure, FailureKind, ScopeError, TaskPanic};
pub use executor::{Executor, InlineExecutor, Job, Rejection};
pub use factory::{TaskFactory, TaskInstance};
pub use runner::TaskRunner;
pub use task::{FromParameter, Parameter, TaskType, WorkTask};
#[cfg(not(target_arch = "wasm32"))]
pub use worker_pool::WorkerPool;
pub use worker_pool::{PoolError, PoolStats};
