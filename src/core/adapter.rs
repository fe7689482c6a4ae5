//! The work adapter: submit parameterized tasks, drain, collect failures.
//!
//! A [`WorkAdapter`] builds a task instance from a task type and a parameter, hands it
//! to an [`Executor`], and tracks it until it resolves. Nothing that goes wrong with a
//! single task is returned from `submit`: construction, scheduling and execution
//! failures are all recorded in completion order and returned together from the next
//! drain as one [`AggregateError`].
//!
//! # Lifecycle
//!
//! ```text
//! Open --submit--> Open --await_all--> Draining --> Open
//!                       --close/drop--> Draining --> Closed
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! use prometheus_work_adapter::core::{
//!     AppResult, FromParameter, InlineExecutor, WorkAdapter, WorkTask,
//! };
//!
//! struct Count(Arc<AtomicUsize>);
//!
//! impl FromParameter<Arc<AtomicUsize>> for Count {
//!     fn from_parameter(counter: Arc<AtomicUsize>) -> AppResult<Self> {
//!         Ok(Self(counter))
//!     }
//! }
//!
//! impl WorkTask for Count {
//!     fn run(&mut self) -> AppResult<()> {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!         Ok(())
//!     }
//! }
//!
//! let counter = Arc::new(AtomicUsize::new(0));
//! let adapter = WorkAdapter::new(Arc::new(InlineExecutor));
//! for _ in 0..3 {
//!     adapter.submit::<Count, _>(Arc::clone(&counter));
//! }
//! adapter.close().unwrap();
//! assert_eq!(counter.load(Ordering::SeqCst), 3);
//! ```

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::error::{AggregateError, Failure, ScopeError};
use super::executor::{Executor, Job, Rejection};
use super::factory::{TaskFactory, TaskInstance};
use super::runner::TaskRunner;
use super::task::{FromParameter, Parameter, TaskType, WorkTask};
use super::worker_pool::PoolError;

/// Identifier of one submission, unique within its adapter.
pub type SubmissionId = u64;

/// Lifecycle phase of a [`WorkAdapter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Accepting submissions.
    Open,
    /// A drain is waiting for outstanding work.
    Draining,
    /// Closed; all work resolved.
    Closed,
}

/// Counters describing what an adapter has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdapterStats {
    /// Submissions accepted.
    pub submitted: u64,
    /// Submissions that resolved without a failure.
    pub succeeded: u64,
    /// Submissions that resolved with a failure.
    pub failed: u64,
    /// Submissions not yet resolved.
    pub outstanding: usize,
}

/// One in-flight submission.
#[derive(Debug)]
struct OutstandingHandle {
    task_type: TaskType,
    submitted_at: Instant,
}

/// State shared between the adapter and the jobs it dispatched.
#[derive(Debug)]
struct AdapterState {
    phase: Phase,
    outstanding: HashMap<SubmissionId, OutstandingHandle>,
    /// Failures in completion order, cleared by each drain.
    failures: Vec<Failure>,
    succeeded: u64,
    failed: u64,
}

#[derive(Debug)]
struct Shared {
    adapter_id: Uuid,
    state: Mutex<AdapterState>,
    /// Signalled whenever the outstanding set becomes empty.
    idle: Condvar,
}

impl Shared {
    /// Resolve a submission. Resolving an id twice is a no-op.
    fn resolve(&self, id: SubmissionId, failure: Option<Failure>) {
        let mut state = self.state.lock();
        let Some(handle) = state.outstanding.remove(&id) else {
            return;
        };
        let elapsed_ms =
            u64::try_from(handle.submitted_at.elapsed().as_millis()).unwrap_or(u64::MAX);

        match failure {
            Some(failure) => {
                warn!(
                    adapter_id = %self.adapter_id,
                    submission = id,
                    task_type = %handle.task_type,
                    kind = ?failure.kind(),
                    elapsed_ms = elapsed_ms,
                    error = %failure,
                    cause = %failure.cause_message(),
                    "Submission failed"
                );
                state.failed += 1;
                state.failures.push(failure);
            }
            None => {
                debug!(
                    adapter_id = %self.adapter_id,
                    submission = id,
                    task_type = %handle.task_type,
                    elapsed_ms = elapsed_ms,
                    "Submission completed"
                );
                state.succeeded += 1;
            }
        }

        if state.outstanding.is_empty() {
            self.idle.notify_all();
        }
    }
}

/// Resolves its submission when the job finishes, or when the job is dropped unrun.
struct Completion {
    shared: Arc<Shared>,
    id: SubmissionId,
    task_type: TaskType,
    finished: bool,
}

impl Completion {
    fn finish(mut self, outcome: Result<(), Failure>) {
        self.finished = true;
        self.shared.resolve(self.id, outcome.err());
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if !self.finished {
            self.shared.resolve(
                self.id,
                Some(Failure::SchedulingFailure {
                    task_type: self.task_type,
                    source: PoolError::Abandoned,
                }),
            );
        }
    }
}

/// Coordinator that runs parameterized tasks on an executor and aggregates failures.
///
/// `submit` and `submit_dyn` take `&self` and may be called from many threads at once.
/// Callers must not submit concurrently with a drain on the same adapter; work submitted
/// after a drain started may or may not be waited for by that drain.
pub struct WorkAdapter {
    shared: Arc<Shared>,
    executor: Arc<dyn Executor>,
    factory: Arc<TaskFactory>,
    next_id: AtomicU64,
}

impl WorkAdapter {
    /// Create an adapter with an empty task registry.
    #[must_use]
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self::with_factory(executor, Arc::new(TaskFactory::new()))
    }

    /// Create an adapter that constructs registry-driven submissions with `factory`.
    #[must_use]
    pub fn with_factory(executor: Arc<dyn Executor>, factory: Arc<TaskFactory>) -> Self {
        let adapter_id = Uuid::new_v4();
        info!(adapter_id = %adapter_id, "WorkAdapter opened");
        Self {
            shared: Arc::new(Shared {
                adapter_id,
                state: Mutex::new(AdapterState {
                    phase: Phase::Open,
                    outstanding: HashMap::new(),
                    failures: Vec::new(),
                    succeeded: 0,
                    failed: 0,
                }),
                idle: Condvar::new(),
            }),
            executor,
            factory,
            next_id: AtomicU64::new(0),
        }
    }

    /// Identifier used in this adapter's log records.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.shared.adapter_id
    }

    /// The registry used by [`Self::submit_dyn`].
    #[must_use]
    pub fn factory(&self) -> &TaskFactory {
        &self.factory
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.shared.state.lock().phase
    }

    /// Number of submissions not yet resolved.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.shared.state.lock().outstanding.len()
    }

    /// Snapshot of the adapter's counters.
    #[must_use]
    pub fn stats(&self) -> AdapterStats {
        let state = self.shared.state.lock();
        AdapterStats {
            submitted: self.next_id.load(Ordering::Relaxed),
            succeeded: state.succeeded,
            failed: state.failed,
            outstanding: state.outstanding.len(),
        }
    }

    /// Construct a `T` from `parameter` and schedule it.
    ///
    /// Returns immediately. If construction fails the failure is recorded and reported
    /// by the next drain, exactly like a failure while running.
    pub fn submit<T, P>(&self, parameter: P) -> SubmissionId
    where
        T: FromParameter<P> + WorkTask,
    {
        let task_type = TaskType::of::<T>();
        let id = self.register(task_type);
        match TaskFactory::construct_typed::<T, P>(parameter) {
            Ok(instance) => self.dispatch(id, task_type, instance),
            Err(failure) => self.shared.resolve(id, Some(failure)),
        }
        id
    }

    /// Construct `task_type` from a type-erased parameter using the registry, and
    /// schedule it.
    ///
    /// A task type with no initializer for the parameter's type is recorded as a
    /// `NoSuitableConstructor` failure and reported by the next drain.
    pub fn submit_dyn(&self, task_type: TaskType, parameter: Parameter) -> SubmissionId {
        let id = self.register(task_type);
        match self.factory.construct(task_type, parameter) {
            Ok(instance) => self.dispatch(id, task_type, instance),
            Err(failure) => self.shared.resolve(id, Some(failure)),
        }
        id
    }

    /// Block until every submission made so far has resolved.
    ///
    /// # Errors
    ///
    /// Returns every failure recorded since the adapter was created or the previous
    /// drain, in completion order. The failures are handed over: a later drain only
    /// reports failures that happen after this one.
    pub fn await_all(&self) -> Result<(), AggregateError> {
        self.drain(Phase::Open)
    }

    /// Drain like [`Self::await_all`] and close the adapter.
    ///
    /// # Errors
    ///
    /// Returns the aggregated failures, if any.
    pub fn close(self) -> Result<(), AggregateError> {
        // Drop sees the Closed phase and does nothing more
        self.drain(Phase::Closed)
    }

    /// Run `body` with this adapter, then close it on every exit path.
    ///
    /// Errors from the body and from the closing drain are both kept. If the body
    /// panics, the adapter is still drained; any task failures are logged and the
    /// panic resumes.
    ///
    /// # Errors
    ///
    /// - [`ScopeError::Body`] when only the body failed
    /// - [`ScopeError::Tasks`] when only tasks failed
    /// - [`ScopeError::Both`] when both did
    pub fn scope<R, E, F>(self, body: F) -> Result<R, ScopeError<E>>
    where
        F: FnOnce(&Self) -> Result<R, E>,
    {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| body(&self)));
        let adapter_id = self.id();
        let drained = self.close();

        match (outcome, drained) {
            (Ok(Ok(value)), Ok(())) => Ok(value),
            (Ok(Ok(_)), Err(tasks)) => Err(ScopeError::Tasks(tasks)),
            (Ok(Err(body)), Ok(())) => Err(ScopeError::Body(body)),
            (Ok(Err(body)), Err(tasks)) => Err(ScopeError::Both { body, tasks }),
            (Err(payload), drained) => {
                if let Err(tasks) = drained {
                    log_unreported(adapter_id, &tasks, "scope body panicked");
                }
                panic::resume_unwind(payload)
            }
        }
    }

    fn register(&self, task_type: TaskType) -> SubmissionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut state = self.shared.state.lock();
        if state.phase == Phase::Draining {
            warn!(
                adapter_id = %self.shared.adapter_id,
                submission = id,
                task_type = %task_type,
                "Submission raced with a drain in progress"
            );
        }
        state.outstanding.insert(
            id,
            OutstandingHandle {
                task_type,
                submitted_at: Instant::now(),
            },
        );
        debug!(
            adapter_id = %self.shared.adapter_id,
            submission = id,
            task_type = %task_type,
            "Submission registered"
        );
        id
    }

    fn dispatch(&self, id: SubmissionId, task_type: TaskType, instance: TaskInstance) {
        let completion = Completion {
            shared: Arc::clone(&self.shared),
            id,
            task_type,
            finished: false,
        };
        let job = Job::new(move || {
            let outcome = TaskRunner::run(task_type, instance);
            completion.finish(outcome);
        });

        // The state lock is not held here: an inline executor resolves during execute
        if let Err(Rejection { error, job }) = self.executor.execute(job) {
            self.shared.resolve(
                id,
                Some(Failure::SchedulingFailure {
                    task_type,
                    source: error,
                }),
            );
            drop(job);
        }
    }

    fn drain(&self, next: Phase) -> Result<(), AggregateError> {
        let mut state = self.shared.state.lock();
        if state.phase == Phase::Closed {
            return Ok(());
        }
        state.phase = Phase::Draining;

        let waiting = state.outstanding.len();
        if waiting > 0 {
            debug!(
                adapter_id = %self.shared.adapter_id,
                outstanding = waiting,
                "Draining outstanding submissions"
            );
        }
        while !state.outstanding.is_empty() {
            self.shared.idle.wait(&mut state);
        }

        state.phase = next;
        let failures = std::mem::take(&mut state.failures);
        drop(state);

        if next == Phase::Closed {
            info!(adapter_id = %self.shared.adapter_id, "WorkAdapter closed");
        }
        AggregateError::from_failures(failures).map_or(Ok(()), Err)
    }
}

impl Drop for WorkAdapter {
    fn drop(&mut self) {
        if self.phase() == Phase::Closed {
            return;
        }
        if let Err(tasks) = self.drain(Phase::Closed) {
            log_unreported(self.shared.adapter_id, &tasks, "adapter dropped without close");
        }
    }
}

impl std::fmt::Debug for WorkAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkAdapter")
            .field("id", &self.shared.adapter_id)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

/// Failures that no caller can receive are logged individually.
fn log_unreported(adapter_id: Uuid, tasks: &AggregateError, reason: &str) {
    error!(
        adapter_id = %adapter_id,
        failures = tasks.len(),
        reason = reason,
        "Task failures could not be returned to the caller"
    );
    for (index, failure) in tasks.iter().enumerate() {
        error!(
            adapter_id = %adapter_id,
            index = index,
            kind = ?failure.kind(),
            error = %failure,
            cause = %failure.cause_message(),
            "Unreported task failure"
        );
    }
}
