//! Failure taxonomy for submitted work and the aggregate reported on drain.
//!
//! Every submission that does not complete cleanly produces exactly one [`Failure`].
//! Failures are never returned from `submit`; the adapter records them in the order
//! they complete and hands them back as a single [`AggregateError`] from the next
//! drain (`await_all`, `close`, or scope exit).

use std::fmt;

use thiserror::Error;

use super::task::TaskType;
use super::worker_pool::PoolError;

/// Application-facing result used by task constructors and task bodies.
pub type AppResult<T> = Result<T, anyhow::Error>;

/// Discriminant of a [`Failure`], convenient for assertions and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// No initializer of the task type accepts the parameter's type.
    NoSuitableConstructor,
    /// The matching initializer ran and failed.
    ConstructionFailure,
    /// The task's operation failed while running.
    ExecutionFailure,
    /// The worker engine refused or dropped the job.
    SchedulingFailure,
}

/// The outcome of one submission that did not complete successfully.
#[derive(Debug, Error)]
pub enum Failure {
    /// The task type has no initializer for the supplied parameter type.
    #[error("no constructor of `{task_type}` accepts a parameter of type `{parameter}`")]
    NoSuitableConstructor {
        /// Task type that was asked to construct itself.
        task_type: TaskType,
        /// Type name of the parameter that was supplied.
        parameter: &'static str,
    },
    /// The initializer was found but returned an error or panicked.
    #[error("failed to construct `{task_type}`")]
    ConstructionFailure {
        /// Task type whose initializer failed.
        task_type: TaskType,
        /// Error raised by the initializer.
        #[source]
        source: anyhow::Error,
    },
    /// The constructed task returned an error or panicked while running.
    #[error("task `{task_type}` failed")]
    ExecutionFailure {
        /// Task type that failed.
        task_type: TaskType,
        /// Error raised by the task body.
        #[source]
        source: anyhow::Error,
    },
    /// The worker engine rejected the job or dropped it before it ran.
    #[error("task `{task_type}` could not be scheduled")]
    SchedulingFailure {
        /// Task type that was never run.
        task_type: TaskType,
        /// Engine error explaining the rejection.
        #[source]
        source: PoolError,
    },
}

impl Failure {
    /// Kind tag of this failure.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::NoSuitableConstructor { .. } => FailureKind::NoSuitableConstructor,
            Self::ConstructionFailure { .. } => FailureKind::ConstructionFailure,
            Self::ExecutionFailure { .. } => FailureKind::ExecutionFailure,
            Self::SchedulingFailure { .. } => FailureKind::SchedulingFailure,
        }
    }

    /// Task type the failure originated from.
    #[must_use]
    pub const fn task_type(&self) -> TaskType {
        match self {
            Self::NoSuitableConstructor { task_type, .. }
            | Self::ConstructionFailure { task_type, .. }
            | Self::ExecutionFailure { task_type, .. }
            | Self::SchedulingFailure { task_type, .. } => *task_type,
        }
    }

    /// The wrapped underlying error, if this kind carries one.
    ///
    /// `NoSuitableConstructor` has no cause: the failure itself is the root.
    #[must_use]
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::NoSuitableConstructor { .. } => None,
            Self::ConstructionFailure { source, .. } | Self::ExecutionFailure { source, .. } => {
                Some(&**source)
            }
            Self::SchedulingFailure { source, .. } => {
                Some(source as &(dyn std::error::Error + Send + Sync + 'static))
            }
        }
    }

    /// Message of the wrapped cause, or of the failure itself when there is none.
    #[must_use]
    pub fn cause_message(&self) -> String {
        self.cause()
            .map_or_else(|| self.to_string(), ToString::to_string)
    }
}

/// Error produced when a task initializer or task body panics.
#[derive(Debug, Error)]
#[error("task panicked: {message}")]
pub struct TaskPanic {
    /// Panic payload rendered as text.
    pub message: String,
}

/// All failures observed during one drain, oldest-completed first.
///
/// An `AggregateError` is never empty. The first failure is the primary cause and
/// is also what [`std::error::Error::source`] returns.
#[derive(Debug)]
pub struct AggregateError {
    failures: Vec<Failure>,
}

impl AggregateError {
    /// Wrap a list of failures. Returns `None` for an empty list.
    #[must_use]
    pub fn from_failures(failures: Vec<Failure>) -> Option<Self> {
        if failures.is_empty() {
            None
        } else {
            Some(Self { failures })
        }
    }

    /// The first failure to complete.
    #[must_use]
    pub fn primary(&self) -> &Failure {
        &self.failures[0]
    }

    /// Every failure in completion order.
    #[must_use]
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    /// Number of failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Always `false`; present for API symmetry with [`Self::len`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of failures of the given kind.
    #[must_use]
    pub fn count_of(&self, kind: FailureKind) -> usize {
        self.failures.iter().filter(|f| f.kind() == kind).count()
    }

    /// Iterate failures in completion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Failure> {
        self.failures.iter()
    }

    /// Take ownership of the failures.
    #[must_use]
    pub fn into_failures(self) -> Vec<Failure> {
        self.failures
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.failures.len();
        let noun = if count == 1 { "task" } else { "tasks" };
        write!(f, "{count} {noun} failed; first: {}", self.primary())
    }
}

impl std::error::Error for AggregateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.primary())
    }
}

impl<'a> IntoIterator for &'a AggregateError {
    type Item = &'a Failure;
    type IntoIter = std::slice::Iter<'a, Failure>;

    fn into_iter(self) -> Self::IntoIter {
        self.failures.iter()
    }
}

impl IntoIterator for AggregateError {
    type Item = Failure;
    type IntoIter = std::vec::IntoIter<Failure>;

    fn into_iter(self) -> Self::IntoIter {
        self.failures.into_iter()
    }
}

/// Outcome of a scoped adapter whose body or tasks failed.
///
/// Neither error is discarded: when both the scope body and the drain fail, both
/// are kept in [`ScopeError::Both`].
#[derive(Debug)]
pub enum ScopeError<E> {
    /// The body failed; every task completed cleanly.
    Body(E),
    /// The body succeeded; one or more tasks failed.
    Tasks(AggregateError),
    /// The body failed and the drain that followed reported task failures.
    Both {
        /// Error returned by the scope body.
        body: E,
        /// Failures reported by the closing drain.
        tasks: AggregateError,
    },
}

impl<E> ScopeError<E> {
    /// Split into the body error and the task aggregate, whichever are present.
    pub fn into_parts(self) -> (Option<E>, Option<AggregateError>) {
        match self {
            Self::Body(body) => (Some(body), None),
            Self::Tasks(tasks) => (None, Some(tasks)),
            Self::Both { body, tasks } => (Some(body), Some(tasks)),
        }
    }

    /// Task failures reported by the closing drain, if any.
    pub const fn tasks(&self) -> Option<&AggregateError> {
        match self {
            Self::Body(_) => None,
            Self::Tasks(tasks) | Self::Both { tasks, .. } => Some(tasks),
        }
    }
}

impl<E: fmt::Display> fmt::Display for ScopeError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Body(body) => write!(f, "scope body failed: {body}"),
            Self::Tasks(tasks) => write!(f, "{tasks}"),
            Self::Both { body, tasks } => {
                write!(f, "scope body failed: {body}; additionally {tasks}")
            }
        }
    }
}

impl<E> std::error::Error for ScopeError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Body(body) | Self::Both { body, .. } => Some(body),
            Self::Tasks(tasks) => Some(tasks),
        }
    }
}
