//! Worker pool configuration.

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Environment variable overriding [`WorkerPoolConfig::worker_count`].
pub const ENV_WORKER_COUNT: &str = "WORK_ADAPTER_WORKER_COUNT";
/// Environment variable overriding [`WorkerPoolConfig::max_queue_depth`].
pub const ENV_MAX_QUEUE_DEPTH: &str = "WORK_ADAPTER_MAX_QUEUE_DEPTH";
/// Environment variable overriding [`WorkerPoolConfig::thread_stack_size`].
pub const ENV_THREAD_STACK_SIZE: &str = "WORK_ADAPTER_THREAD_STACK_SIZE";
/// Environment variable overriding [`WorkerPoolConfig::thread_name_prefix`].
pub const ENV_THREAD_NAME_PREFIX: &str = "WORK_ADAPTER_THREAD_NAME_PREFIX";

const DEFAULT_THREAD_STACK_SIZE: usize = 2 * 1024 * 1024;
const MIN_THREAD_STACK_SIZE: usize = 64 * 1024;
const DEFAULT_THREAD_NAME_PREFIX: &str = "work-adapter";

/// Configuration of a [`WorkerPool`](crate::core::WorkerPool).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerPoolConfig {
    /// Number of dedicated worker threads.
    pub worker_count: usize,
    /// Maximum queued jobs before `execute` rejects with `QueueFull`.
    ///
    /// `None` (the default) leaves the queue unbounded, so the pool never refuses work
    /// while it is running.
    pub max_queue_depth: Option<usize>,
    /// Stack size of each worker thread in bytes.
    pub thread_stack_size: usize,
    /// Worker threads are named `{prefix}-{index}`.
    pub thread_name_prefix: String,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            worker_count: num_cpus::get(),
            max_queue_depth: None,
            thread_stack_size: DEFAULT_THREAD_STACK_SIZE,
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
        }
    }
}

impl WorkerPoolConfig {
    /// Default configuration: one worker per logical CPU.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of worker threads.
    #[must_use]
    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Bound the queue at `max_queue_depth` jobs.
    #[must_use]
    pub fn with_max_queue_depth(mut self, max_queue_depth: usize) -> Self {
        self.max_queue_depth = Some(max_queue_depth);
        self
    }

    /// Remove the queue bound.
    #[must_use]
    pub fn with_unbounded_queue(mut self) -> Self {
        self.max_queue_depth = None;
        self
    }

    /// Set the worker thread stack size in bytes.
    #[must_use]
    pub fn with_thread_stack_size(mut self, thread_stack_size: usize) -> Self {
        self.thread_stack_size = thread_stack_size;
        self
    }

    /// Set the worker thread name prefix.
    #[must_use]
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.worker_count == 0 {
            return Err("worker_count must be greater than 0".into());
        }
        if self.max_queue_depth == Some(0) {
            return Err("max_queue_depth must be greater than 0".into());
        }
        if self.thread_stack_size < MIN_THREAD_STACK_SIZE {
            return Err(format!(
                "thread_stack_size must be at least {MIN_THREAD_STACK_SIZE} bytes"
            ));
        }
        if self.thread_name_prefix.is_empty() {
            return Err("thread_name_prefix must not be empty".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns a parse or validation error message.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from the environment, loading a `.env` file if present.
    ///
    /// Unset variables keep their default values.
    ///
    /// # Errors
    ///
    /// Returns a message naming the variable that failed to parse, or a validation error.
    pub fn from_env() -> Result<Self, String> {
        // A missing .env file is not an error
        let _ = dotenvy::dotenv();

        let mut cfg = Self::default();
        if let Some(worker_count) = env_var(ENV_WORKER_COUNT)? {
            cfg.worker_count = worker_count;
        }
        if let Some(depth) = env_var(ENV_MAX_QUEUE_DEPTH)? {
            cfg.max_queue_depth = Some(depth);
        }
        if let Some(stack) = env_var(ENV_THREAD_STACK_SIZE)? {
            cfg.thread_stack_size = stack;
        }
        if let Ok(prefix) = env::var(ENV_THREAD_NAME_PREFIX) {
            cfg.thread_name_prefix = prefix;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

fn env_var<T>(name: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| format!("{name}: {e}")),
        Err(_) => Ok(None),
    }
}
