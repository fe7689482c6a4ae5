//! Task type descriptors, type-erased parameters and the task contracts.

use std::any::{self, Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use super::error::AppResult;

/// A unit of work produced from a parameter value.
///
/// The runner calls [`WorkTask::run`] exactly once and drops the instance afterwards.
///
/// ```rust
/// use prometheus_work_adapter::core::{AppResult, FromParameter, WorkTask};
///
/// struct Compile {
///     source: String,
/// }
///
/// impl FromParameter<String> for Compile {
///     fn from_parameter(source: String) -> AppResult<Self> {
///         Ok(Self { source })
///     }
/// }
///
/// impl WorkTask for Compile {
///     fn run(&mut self) -> AppResult<()> {
///         anyhow::ensure!(!self.source.is_empty(), "nothing to compile");
///         Ok(())
///     }
/// }
/// ```
pub trait WorkTask: Send + 'static {
    /// Perform the task's side effects.
    ///
    /// # Errors
    ///
    /// Any error returned here is reported as an execution failure on the next drain.
    fn run(&mut self) -> AppResult<()>;
}

/// Capability of a task type to be built from a parameter of type `P`.
///
/// Implementing this trait is what grants the adapter the right to construct the
/// task. The type's fields and inherent constructors may stay private to its module.
/// A task type may implement it for several parameter types.
pub trait FromParameter<P>: Sized {
    /// Build a task instance from its parameter.
    ///
    /// # Errors
    ///
    /// Any error returned here is reported as a construction failure.
    fn from_parameter(parameter: P) -> AppResult<Self>;
}

/// Identity of a task type: its `TypeId` plus a readable name for diagnostics.
#[derive(Clone, Copy)]
pub struct TaskType {
    id: TypeId,
    name: &'static str,
}

impl TaskType {
    /// Descriptor for the task type `T`.
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: any::type_name::<T>(),
        }
    }

    /// Fully qualified type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Last path segment of the type name, e.g. `Action` for `my_crate::jobs::Action`.
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }

    /// Underlying type identity.
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.id
    }
}

impl PartialEq for TaskType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TaskType {}

impl Hash for TaskType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TaskType({})", self.name)
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// An owned, type-erased parameter value for registry-driven submission.
pub struct Parameter {
    value: Box<dyn Any + Send>,
    type_id: TypeId,
    type_name: &'static str,
}

impl Parameter {
    /// Erase a parameter value, remembering its runtime type.
    pub fn new<P: Send + 'static>(value: P) -> Self {
        Self {
            value: Box::new(value),
            type_id: TypeId::of::<P>(),
            type_name: any::type_name::<P>(),
        }
    }

    /// Runtime type identity of the wrapped value.
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Type name of the wrapped value.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether the wrapped value is a `P`.
    #[must_use]
    pub fn is<P: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<P>()
    }

    /// Recover the value as a `P`, handing the parameter back on mismatch.
    ///
    /// # Errors
    ///
    /// Returns `self` unchanged if the value is not a `P`.
    pub fn downcast<P: 'static>(self) -> Result<P, Self> {
        if !self.is::<P>() {
            return Err(self);
        }
        let Self {
            value,
            type_id,
            type_name,
        } = self;
        value.downcast::<P>().map(|boxed| *boxed).map_err(|value| Self {
            value,
            type_id,
            type_name,
        })
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}
