//! Builder that wires a task registry, an executor and a work adapter together.

use std::sync::Arc;

use tracing::debug;

use crate::config::WorkerPoolConfig;
use crate::core::{Executor, FromParameter, PoolError, TaskFactory, WorkAdapter, WorkTask};

/// Builds a [`WorkAdapter`], spawning a [`WorkerPool`](crate::core::WorkerPool) from
/// configuration unless an executor is supplied.
///
/// ```rust
/// use prometheus_work_adapter::builders::AdapterBuilder;
/// use prometheus_work_adapter::config::WorkerPoolConfig;
/// use prometheus_work_adapter::core::{AppResult, FromParameter, WorkTask};
///
/// struct Noop;
///
/// impl FromParameter<()> for Noop {
///     fn from_parameter(_: ()) -> AppResult<Self> {
///         Ok(Self)
///     }
/// }
///
/// impl WorkTask for Noop {
///     fn run(&mut self) -> AppResult<()> {
///         Ok(())
///     }
/// }
///
/// let adapter = AdapterBuilder::new()
///     .config(WorkerPoolConfig::new().with_worker_count(2))
///     .register::<Noop, ()>()
///     .build()?;
/// adapter.submit::<Noop, _>(());
/// adapter.close().unwrap();
/// # Ok::<(), prometheus_work_adapter::core::PoolError>(())
/// ```
#[derive(Default)]
pub struct AdapterBuilder {
    config: Option<WorkerPoolConfig>,
    executor: Option<Arc<dyn Executor>>,
    factory: TaskFactory,
}

impl AdapterBuilder {
    /// Start with default pool configuration and an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration for the worker pool the builder spawns.
    #[must_use]
    pub fn config(mut self, config: WorkerPoolConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use an existing executor instead of spawning a pool. Takes precedence over `config`.
    #[must_use]
    pub fn executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Register the initializer `T::from_parameter(P)` for `submit_dyn`.
    #[must_use]
    pub fn register<T, P>(self) -> Self
    where
        T: FromParameter<P> + WorkTask,
        P: Send + 'static,
    {
        self.factory.register::<T, P>();
        self
    }

    /// Make `T` known to the registry without any initializer.
    #[must_use]
    pub fn declare<T: 'static>(self) -> Self {
        self.factory.declare::<T>();
        self
    }

    /// Configured pool settings, if any were given.
    #[must_use]
    pub const fn pool_config(&self) -> Option<&WorkerPoolConfig> {
        self.config.as_ref()
    }

    /// Build the adapter.
    ///
    /// # Errors
    ///
    /// Returns a `PoolError` if the worker pool cannot be created.
    pub fn build(self) -> Result<WorkAdapter, PoolError> {
        let executor = match self.executor {
            Some(executor) => executor,
            None => spawn_pool(self.config.unwrap_or_default())?,
        };
        debug!(factory = ?self.factory, "Building WorkAdapter");
        Ok(WorkAdapter::with_factory(executor, Arc::new(self.factory)))
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn spawn_pool(config: WorkerPoolConfig) -> Result<Arc<dyn Executor>, PoolError> {
    Ok(Arc::new(crate::core::WorkerPool::new(config)?))
}

#[cfg(target_arch = "wasm32")]
fn spawn_pool(_config: WorkerPoolConfig) -> Result<Arc<dyn Executor>, PoolError> {
    Err(PoolError::InvalidConfig(
        "no worker pool on this target; supply an executor".into(),
    ))
}
