//! Tests for error types

use prometheus_task_pool::core::PoolError;

#[test]
fn test_invalid_config_error() {
    let err = PoolError::InvalidConfig("concurrency must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: concurrency must be greater than 0"
    );
    assert!(err.is_config());
}

#[test]
fn test_aborted_error() {
    let err = PoolError::Aborted {
        origin: 3,
        reason: "connection reset".to_string(),
    };
    assert_eq!(format!("{}", err), "pool aborted: task 3 failed: connection reset");
    assert!(!err.is_config());
}

#[test]
fn test_cancelled_error() {
    let err = PoolError::Cancelled;
    assert_eq!(format!("{}", err), "pool cancelled");
}

#[test]
fn test_runtime_error() {
    let err = PoolError::Runtime("no reactor running".to_string());
    assert_eq!(format!("{}", err), "runtime unavailable: no reactor running");
}

#[test]
fn test_pool_error_converts_into_anyhow() {
    let result: prometheus_task_pool::core::AppResult<()> = Err(PoolError::Cancelled.into());
    assert_eq!(result.unwrap_err().to_string(), "pool cancelled");
}
