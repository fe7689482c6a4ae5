//! Tests for configuration validation

use prometheus_work_adapter::config::WorkerPoolConfig;

#[test]
fn test_default_config_is_valid() {
    let config = WorkerPoolConfig::new();
    assert!(config.worker_count >= 1);
    assert_eq!(config.max_queue_depth, None);
    assert!(config.validate().is_ok());
}

#[test]
fn test_invalid_worker_count() {
    let invalid = WorkerPoolConfig::new().with_worker_count(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_invalid_queue_depth() {
    let invalid = WorkerPoolConfig::new().with_max_queue_depth(0);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_queue_bound_is_opt_in() {
    let bounded = WorkerPoolConfig::new().with_max_queue_depth(8);
    assert_eq!(bounded.max_queue_depth, Some(8));
    assert!(bounded.validate().is_ok());

    let unbounded = bounded.with_unbounded_queue();
    assert_eq!(unbounded.max_queue_depth, None);
    assert!(unbounded.validate().is_ok());
}

#[test]
fn test_invalid_stack_size() {
    let invalid = WorkerPoolConfig::new().with_thread_stack_size(1024);
    assert!(invalid.validate().is_err());
}

#[test]
fn test_invalid_thread_name_prefix() {
    let invalid = WorkerPoolConfig::new().with_thread_name_prefix("");
    assert!(invalid.validate().is_err());
}

#[test]
fn test_config_from_json() {
    let json = r#"{
        "worker_count": 3,
        "max_queue_depth": 50,
        "thread_name_prefix": "lint-worker"
    }"#;

    let config = WorkerPoolConfig::from_json_str(json).unwrap();
    assert_eq!(config.worker_count, 3);
    assert_eq!(config.max_queue_depth, Some(50));
    assert_eq!(config.thread_name_prefix, "lint-worker");
    assert_eq!(
        config.thread_stack_size,
        WorkerPoolConfig::default().thread_stack_size
    );
}

#[test]
fn test_config_from_json_rejects_invalid() {
    assert!(WorkerPoolConfig::from_json_str(r#"{ "worker_count": 0 }"#).is_err());
    assert!(WorkerPoolConfig::from_json_str("not json").is_err());
}

#[test]
fn test_config_from_env() {
    use prometheus_work_adapter::config::pool::{
        ENV_MAX_QUEUE_DEPTH, ENV_THREAD_NAME_PREFIX, ENV_WORKER_COUNT,
    };

    std::env::set_var(ENV_WORKER_COUNT, "5");
    std::env::set_var(ENV_MAX_QUEUE_DEPTH, " 64 ");
    std::env::set_var(ENV_THREAD_NAME_PREFIX, "env-worker");
    let config = WorkerPoolConfig::from_env();

    std::env::set_var(ENV_WORKER_COUNT, "many");
    let unparsable = WorkerPoolConfig::from_env();

    std::env::remove_var(ENV_WORKER_COUNT);
    std::env::remove_var(ENV_MAX_QUEUE_DEPTH);
    std::env::remove_var(ENV_THREAD_NAME_PREFIX);

    let config = config.unwrap();
    assert_eq!(config.worker_count, 5);
    assert_eq!(config.max_queue_depth, Some(64));
    assert_eq!(config.thread_name_prefix, "env-worker");

    let message = unparsable.unwrap_err();
    assert!(message.contains(ENV_WORKER_COUNT), "got: {message}");
}
