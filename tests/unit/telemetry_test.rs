//! Tests for telemetry helpers

use prometheus_task_pool::util::{init_tracing, DEFAULT_FILTER};

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
    assert!(tracing::dispatcher::has_been_set());
}

#[test]
fn test_default_filter_targets_crate() {
    assert!(DEFAULT_FILTER.starts_with("prometheus_task_pool"));
}
