//! Runtime adapters for alternative worker engines.

#[cfg(feature = "tokio-runtime")]
pub mod tokio_executor;

#[cfg(feature = "tokio-runtime")]
pub use tokio_executor::TokioExecutor;
