//! Tests for task construction through the registry

use prometheus_work_adapter::core::{
    AppResult, Failure, FailureKind, FromParameter, Parameter, TaskFactory, TaskPanic, TaskType,
    WorkTask,
};

#[derive(Debug, Clone)]
struct Params {
    param0: String,
    param1: String,
}

fn params(a: &str, b: &str) -> Params {
    Params {
        param0: a.to_string(),
        param1: b.to_string(),
    }
}

struct StrictAction {
    params: Params,
}

impl FromParameter<Params> for StrictAction {
    fn from_parameter(params: Params) -> AppResult<Self> {
        anyhow::ensure!(
            !params.param0.is_empty(),
            "Exception in constructor test : {}",
            params.param0
        );
        Ok(Self { params })
    }
}

impl WorkTask for StrictAction {
    fn run(&mut self) -> AppResult<()> {
        anyhow::ensure!(self.params.param0 == self.params.param1, "wrong parameters value");
        Ok(())
    }
}

struct PanickyConstructor;

impl FromParameter<Params> for PanickyConstructor {
    fn from_parameter(params: Params) -> AppResult<Self> {
        panic!("Exception in constructor test : {}", params.param0);
    }
}

impl WorkTask for PanickyConstructor {
    fn run(&mut self) -> AppResult<()> {
        Ok(())
    }
}

fn factory() -> TaskFactory {
    let factory = TaskFactory::new();
    factory
        .register::<StrictAction, Params>()
        .register::<PanickyConstructor, Params>();
    factory
}

#[test]
fn test_construct_and_run() {
    let mut task = factory()
        .construct(TaskType::of::<StrictAction>(), Parameter::new(params("foo", "foo")))
        .unwrap();
    assert!(task.run().is_ok());
}

#[test]
fn test_constructed_task_reports_run_error() {
    let mut task = factory()
        .construct(TaskType::of::<StrictAction>(), Parameter::new(params("foo", "bar")))
        .unwrap();
    assert_eq!(task.run().unwrap_err().to_string(), "wrong parameters value");
}

#[test]
fn test_wrong_parameter_type() {
    let err = factory()
        .construct(TaskType::of::<StrictAction>(), Parameter::new("foo"))
        .err()
        .unwrap();
    assert_eq!(err.kind(), FailureKind::NoSuitableConstructor);
    assert_eq!(err.task_type(), TaskType::of::<StrictAction>());
}

#[test]
fn test_initializer_error_is_construction_failure() {
    let err = factory()
        .construct(TaskType::of::<StrictAction>(), Parameter::new(params("", "foo")))
        .err()
        .unwrap();
    assert_eq!(err.kind(), FailureKind::ConstructionFailure);
    assert_eq!(err.cause_message(), "Exception in constructor test : ");
}

#[test]
fn test_initializer_panic_is_construction_failure() {
    let err = factory()
        .construct(
            TaskType::of::<PanickyConstructor>(),
            Parameter::new(params("foo", "foo")),
        )
        .err()
        .unwrap();
    let Failure::ConstructionFailure { source, .. } = err else {
        panic!("expected a construction failure");
    };
    let panic = source.downcast_ref::<TaskPanic>().unwrap();
    assert_eq!(panic.message, "Exception in constructor test : foo");
}

#[test]
fn test_construct_typed_bypasses_registry() {
    let mut task = TaskFactory::construct_typed::<StrictAction, _>(params("x", "x")).unwrap();
    assert!(task.run().is_ok());

    let err = TaskFactory::construct_typed::<StrictAction, _>(params("", "x"))
        .err()
        .unwrap();
    assert_eq!(err.kind(), FailureKind::ConstructionFailure);
}

#[test]
fn test_known_task_types() {
    struct Unregistered;

    let factory = factory();
    assert!(factory.is_known(TaskType::of::<StrictAction>()));
    assert!(!factory.is_known(TaskType::of::<Unregistered>()));

    factory.declare::<Unregistered>();
    assert!(factory.is_known(TaskType::of::<Unregistered>()));
    assert_eq!(factory.initializer_count(TaskType::of::<Unregistered>()), 0);
}
