//! Capability-indexed task construction.
//!
//! A [`TaskFactory`] maps `(task type, parameter type)` pairs to initializers. Task
//! types opt in by implementing [`FromParameter`]; registration records that
//! capability so a task can later be built from a type-erased [`Parameter`].
//!
//! ```rust
//! use prometheus_work_adapter::core::{
//!     AppResult, FailureKind, FromParameter, Parameter, TaskFactory, TaskType, WorkTask,
//! };
//!
//! struct Resize(u32);
//!
//! impl FromParameter<u32> for Resize {
//!     fn from_parameter(width: u32) -> AppResult<Self> {
//!         Ok(Self(width))
//!     }
//! }
//!
//! impl WorkTask for Resize {
//!     fn run(&mut self) -> AppResult<()> {
//!         Ok(())
//!     }
//! }
//!
//! let factory = TaskFactory::new();
//! factory.register::<Resize, u32>();
//!
//! assert!(factory.construct(TaskType::of::<Resize>(), Parameter::new(640_u32)).is_ok());
//!
//! let err = factory
//!     .construct(TaskType::of::<Resize>(), Parameter::new("wide"))
//!     .err()
//!     .unwrap();
//! assert_eq!(err.kind(), FailureKind::NoSuitableConstructor);
//! ```

use std::any::{self, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use super::error::{AppResult, Failure};
use super::task::{FromParameter, Parameter, TaskType, WorkTask};
use crate::util::panic::catch_task_panic;

/// A boxed, ready-to-run task instance.
pub type TaskInstance = Box<dyn WorkTask>;

type Construct = Arc<dyn Fn(Parameter) -> AppResult<TaskInstance> + Send + Sync>;

/// One registered initializer of a task type.
#[derive(Clone)]
struct Initializer {
    parameter: TypeId,
    parameter_name: &'static str,
    construct: Construct,
}

/// Registry of task initializers keyed by task type and parameter type.
///
/// Registration and construction are both `&self` and safe to call concurrently.
#[derive(Default)]
pub struct TaskFactory {
    initializers: RwLock<HashMap<TaskType, Vec<Initializer>>>,
}

impl TaskFactory {
    /// Create an empty factory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the initializer `T::from_parameter(P)`.
    ///
    /// Registering the same pair twice replaces the earlier entry.
    pub fn register<T, P>(&self) -> &Self
    where
        T: FromParameter<P> + WorkTask,
        P: Send + 'static,
    {
        let task_type = TaskType::of::<T>();
        let initializer = Initializer {
            parameter: TypeId::of::<P>(),
            parameter_name: any::type_name::<P>(),
            construct: Arc::new(|parameter: Parameter| -> AppResult<TaskInstance> {
                let value = parameter.downcast::<P>().map_err(|other| {
                    anyhow::anyhow!(
                        "parameter of type `{}` routed to wrong initializer",
                        other.type_name()
                    )
                })?;
                let task = T::from_parameter(value)?;
                Ok(Box::new(task) as TaskInstance)
            }),
        };

        let mut initializers = self.initializers.write();
        let entries = initializers.entry(task_type).or_default();
        entries.retain(|existing| existing.parameter != initializer.parameter);
        debug!(
            task_type = %task_type,
            parameter = initializer.parameter_name,
            "Registered task initializer"
        );
        entries.push(initializer);
        self
    }

    /// Make `T` known to the factory without registering any initializer.
    pub fn declare<T: 'static>(&self) -> &Self {
        self.initializers
            .write()
            .entry(TaskType::of::<T>())
            .or_default();
        self
    }

    /// Whether the task type has been registered or declared.
    #[must_use]
    pub fn is_known(&self, task_type: TaskType) -> bool {
        self.initializers.read().contains_key(&task_type)
    }

    /// Number of initializers registered for a task type.
    #[must_use]
    pub fn initializer_count(&self, task_type: TaskType) -> usize {
        self.initializers
            .read()
            .get(&task_type)
            .map_or(0, Vec::len)
    }

    /// Build an instance of `task_type` from a type-erased parameter.
    ///
    /// # Errors
    ///
    /// - [`Failure::NoSuitableConstructor`] if no initializer accepts the parameter's type
    /// - [`Failure::ConstructionFailure`] if the initializer fails or panics
    pub fn construct(
        &self,
        task_type: TaskType,
        parameter: Parameter,
    ) -> Result<TaskInstance, Failure> {
        let construct = {
            let initializers = self.initializers.read();
            initializers
                .get(&task_type)
                .and_then(|entries| {
                    entries
                        .iter()
                        .find(|entry| entry.parameter == parameter.type_id())
                })
                .map(|entry| Arc::clone(&entry.construct))
        };

        let Some(construct) = construct else {
            return Err(Failure::NoSuitableConstructor {
                task_type,
                parameter: parameter.type_name(),
            });
        };

        trace!(task_type = %task_type, parameter = parameter.type_name(), "Constructing task");
        catch_task_panic(|| construct(parameter))
            .map_err(|source| Failure::ConstructionFailure { task_type, source })
    }

    /// Build a `T` directly from its parameter, bypassing the registry.
    ///
    /// # Errors
    ///
    /// Returns [`Failure::ConstructionFailure`] if the initializer fails or panics.
    pub fn construct_typed<T, P>(parameter: P) -> Result<TaskInstance, Failure>
    where
        T: FromParameter<P> + WorkTask,
    {
        catch_task_panic(|| T::from_parameter(parameter))
            .map(|task| Box::new(task) as TaskInstance)
            .map_err(|source| Failure::ConstructionFailure {
                task_type: TaskType::of::<T>(),
                source,
            })
    }
}

impl std::fmt::Debug for TaskFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let initializers = self.initializers.read();
        let mut map = f.debug_map();
        for (task_type, entries) in initializers.iter() {
            let params: Vec<&str> = entries.iter().map(|e| e.parameter_name).collect();
            map.entry(task_type, &params);
        }
        map.finish()
    }
}
