//! Tests for utility functions

use prometheus_work_adapter::core::TaskPanic;
use prometheus_work_adapter::util::{catch_task_panic, init_tracing, panic_message};

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
    tracing::info!("tracing initialized twice without panicking");
}

#[test]
fn test_panic_message_payloads() {
    let payload: Box<dyn std::any::Any + Send> = Box::new("static");
    assert_eq!(panic_message(payload.as_ref()), "static");

    let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
    assert_eq!(panic_message(payload.as_ref()), "owned");

    let payload: Box<dyn std::any::Any + Send> = Box::new(42_u8);
    assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
}

#[test]
fn test_catch_task_panic_wraps_panic() {
    let err = catch_task_panic::<()>(|| panic!("constructor exploded")).unwrap_err();
    let panic = err.downcast_ref::<TaskPanic>().unwrap();
    assert_eq!(panic.message, "constructor exploded");
}
