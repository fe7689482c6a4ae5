//! Tests for failure and aggregate error types

use std::error::Error;

use prometheus_work_adapter::core::{
    AggregateError, Failure, FailureKind, PoolError, ScopeError, TaskType,
};

struct Action;

fn execution(message: &str) -> Failure {
    Failure::ExecutionFailure {
        task_type: TaskType::of::<Action>(),
        source: anyhow::anyhow!(message.to_string()),
    }
}

#[test]
fn test_no_suitable_constructor_display() {
    let err = Failure::NoSuitableConstructor {
        task_type: TaskType::of::<Action>(),
        parameter: "u32",
    };
    assert_eq!(
        format!("{}", err),
        "no constructor of `Action` accepts a parameter of type `u32`"
    );
    assert!(err.cause().is_none());
    assert_eq!(err.kind(), FailureKind::NoSuitableConstructor);
}

#[test]
fn test_execution_failure_wraps_cause() {
    let err = execution("wrong parameters value");
    assert_eq!(format!("{}", err), "task `Action` failed");
    assert_eq!(err.cause_message(), "wrong parameters value");
    assert_eq!(
        err.source().map(ToString::to_string).as_deref(),
        Some("wrong parameters value")
    );
}

#[test]
fn test_scheduling_failure_display() {
    let err = Failure::SchedulingFailure {
        task_type: TaskType::of::<Action>(),
        source: PoolError::QueueFull,
    };
    assert_eq!(format!("{}", err), "task `Action` could not be scheduled");
    assert_eq!(err.cause_message(), "job queue is full");
}

#[test]
fn test_aggregate_error_requires_failures() {
    assert!(AggregateError::from_failures(Vec::new()).is_none());
}

#[test]
fn test_aggregate_error_primary_and_order() {
    let agg = AggregateError::from_failures(vec![execution("first"), execution("second")]).unwrap();

    assert_eq!(agg.len(), 2);
    assert_eq!(agg.primary().cause_message(), "first");
    assert_eq!(
        agg.iter().map(Failure::cause_message).collect::<Vec<_>>(),
        vec!["first", "second"]
    );
    assert_eq!(format!("{}", agg), "2 tasks failed; first: task `Action` failed");
    assert_eq!(
        agg.source().map(ToString::to_string).as_deref(),
        Some("task `Action` failed")
    );
}

#[test]
fn test_aggregate_error_single_display() {
    let agg = AggregateError::from_failures(vec![execution("only")]).unwrap();
    assert_eq!(format!("{}", agg), "1 task failed; first: task `Action` failed");
}

#[test]
fn test_scope_error_keeps_both() {
    let agg = AggregateError::from_failures(vec![execution("task")]).unwrap();
    let err: ScopeError<std::io::Error> = ScopeError::Both {
        body: std::io::Error::other("body"),
        tasks: agg,
    };
    assert!(err.tasks().is_some());
    assert_eq!(
        format!("{}", err),
        "scope body failed: body; additionally 1 task failed; first: task `Action` failed"
    );

    let (body, tasks) = err.into_parts();
    assert_eq!(body.unwrap().to_string(), "body");
    assert_eq!(tasks.unwrap().len(), 1);
}
