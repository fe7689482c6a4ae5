//! Tests for builder modules

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use prometheus_work_adapter::builders::AdapterBuilder;
use prometheus_work_adapter::config::WorkerPoolConfig;
use prometheus_work_adapter::core::{
    AppResult, FailureKind, FromParameter, InlineExecutor, Parameter, PoolError, TaskType,
    WorkTask,
};

struct Tick(Arc<AtomicUsize>);

impl FromParameter<Arc<AtomicUsize>> for Tick {
    fn from_parameter(counter: Arc<AtomicUsize>) -> AppResult<Self> {
        Ok(Self(counter))
    }
}

impl WorkTask for Tick {
    fn run(&mut self) -> AppResult<()> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn test_builder_keeps_config() {
    let builder = AdapterBuilder::new().config(WorkerPoolConfig::new().with_worker_count(3));
    assert_eq!(builder.pool_config().map(|c| c.worker_count), Some(3));
}

#[test]
fn test_builder_registers_task_types() {
    let counter = Arc::new(AtomicUsize::new(0));
    let adapter = AdapterBuilder::new()
        .executor(Arc::new(InlineExecutor))
        .register::<Tick, Arc<AtomicUsize>>()
        .build()
        .unwrap();

    assert_eq!(adapter.factory().initializer_count(TaskType::of::<Tick>()), 1);
    adapter.submit_dyn(TaskType::of::<Tick>(), Parameter::new(Arc::clone(&counter)));
    adapter.close().unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn test_builder_declared_type_fails_on_drain() {
    let adapter = AdapterBuilder::new()
        .executor(Arc::new(InlineExecutor))
        .declare::<Tick>()
        .build()
        .unwrap();

    adapter.submit_dyn(TaskType::of::<Tick>(), Parameter::new(7_u32));
    let err = adapter.close().unwrap_err();
    assert_eq!(err.count_of(FailureKind::NoSuitableConstructor), 1);
}

#[test]
fn test_builder_spawns_pool_from_config() {
    let counter = Arc::new(AtomicUsize::new(0));
    let adapter = AdapterBuilder::new()
        .config(WorkerPoolConfig::new().with_worker_count(2))
        .build()
        .unwrap();

    for _ in 0..10 {
        adapter.submit::<Tick, _>(Arc::clone(&counter));
    }
    adapter.close().unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 10);
}

#[test]
fn test_builder_rejects_invalid_config() {
    let result = AdapterBuilder::new()
        .config(WorkerPoolConfig::new().with_max_queue_depth(0))
        .build();
    assert!(matches!(result, Err(PoolError::InvalidConfig(_))));
}
