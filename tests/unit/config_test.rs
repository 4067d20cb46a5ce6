//! Tests for configuration validation

use prometheus_task_pool::config::{AbortPolicy, AggregateMode, PoolConfig};

#[test]
fn test_pool_config_defaults() {
    let config = PoolConfig::default();
    assert_eq!(config.concurrency, 2);
    assert!(config.fail_fast);
    assert_eq!(config.mode, AggregateMode::Timings);
    assert_eq!(config.on_abort, AbortPolicy::Abandon);
    assert!(config.validate().is_ok());
}

#[test]
fn test_pool_config_invalid_concurrency() {
    let invalid = PoolConfig {
        concurrency: 0,
        ..PoolConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_pool_config_from_json() {
    let json = r#"{
        "concurrency": 8,
        "fail_fast": false,
        "mode": "success_flag",
        "on_abort": "cancel"
    }"#;

    let config = PoolConfig::from_json_str(json).expect("valid json");
    assert_eq!(config.concurrency, 8);
    assert!(!config.fail_fast);
    assert_eq!(config.mode, AggregateMode::SuccessFlag);
    assert_eq!(config.on_abort, AbortPolicy::Cancel);
}

#[test]
fn test_pool_config_from_partial_json_keeps_defaults() {
    let config = PoolConfig::from_json_str(r#"{ "concurrency": 5 }"#).expect("valid json");
    assert_eq!(config.concurrency, 5);
    assert!(config.fail_fast);
    assert_eq!(config.mode, AggregateMode::Timings);
}

#[test]
fn test_pool_config_from_json_rejects_zero_and_negative() {
    assert!(PoolConfig::from_json_str(r#"{ "concurrency": 0 }"#).is_err());
    assert!(PoolConfig::from_json_str(r#"{ "concurrency": -2 }"#).is_err());
}

#[test]
fn test_pool_config_round_trips_through_json() {
    let config = PoolConfig {
        concurrency: 3,
        fail_fast: false,
        mode: AggregateMode::SuccessFlag,
        on_abort: AbortPolicy::Cancel,
    };
    let json = serde_json::to_string(&config).expect("serialize");
    assert_eq!(PoolConfig::from_json_str(&json), Ok(config));
}
