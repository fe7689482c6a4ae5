//! Execution of a single constructed task.

use tracing::trace;

use super::error::Failure;
use super::factory::TaskInstance;
use super::task::TaskType;
use crate::util::panic::catch_task_panic;

/// Runs constructed tasks and converts their errors into [`Failure`]s.
///
/// The runner owns the instance for the duration of the call, so each task runs
/// exactly once and is dropped afterwards. Panics from `run` or from the task's
/// `Drop` are caught here and never reach the worker thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskRunner;

impl TaskRunner {
    /// Execute `instance` once.
    ///
    /// # Errors
    ///
    /// Returns [`Failure::ExecutionFailure`] wrapping the task's error or panic.
    pub fn run(task_type: TaskType, mut instance: TaskInstance) -> Result<(), Failure> {
        trace!(task_type = %task_type, "Running task");
        catch_task_panic(move || {
            let outcome = instance.run();
            drop(instance);
            outcome
        })
        .map_err(|source| Failure::ExecutionFailure { task_type, source })
    }
}
