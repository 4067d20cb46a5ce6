//! Tests for builder modules

use prometheus_task_pool::builders::TaskPoolBuilder;
use prometheus_task_pool::config::{AbortPolicy, AggregateMode, PoolConfig};
use prometheus_task_pool::core::{PoolError, Spawn};

/// Spawner that never drives anything; building a pool does not spawn.
#[derive(Clone)]
struct NoopSpawner;

impl Spawn for NoopSpawner {
    fn spawn<F>(&self, _fut: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
    }
}

#[test]
fn test_builder_defaults() {
    let builder = TaskPoolBuilder::new();
    assert_eq!(builder.config(), &PoolConfig::default());
}

#[test]
fn test_builder_overrides() {
    let pool = TaskPoolBuilder::new()
        .concurrency(6)
        .fail_fast(false)
        .mode(AggregateMode::SuccessFlag)
        .on_abort(AbortPolicy::Cancel)
        .build(NoopSpawner)
        .expect("valid configuration");

    assert_eq!(pool.config().concurrency, 6);
    assert!(!pool.config().fail_fast);
    assert_eq!(pool.config().mode, AggregateMode::SuccessFlag);
    assert_eq!(pool.config().on_abort, AbortPolicy::Cancel);
}

#[test]
fn test_builder_concurrency_from_cpus() {
    let builder = TaskPoolBuilder::new().concurrency_from_cpus();
    assert_eq!(builder.config().concurrency, num_cpus::get());
}

#[test]
fn test_builder_rejects_zero_concurrency() {
    let result = TaskPoolBuilder::from_config(PoolConfig {
        concurrency: 0,
        ..PoolConfig::default()
    })
    .build(NoopSpawner);
    assert!(matches!(result, Err(PoolError::InvalidConfig(_))));
}
