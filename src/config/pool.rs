//! Pool configuration structures.

use std::env;

use anyhow::{anyhow, Context};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::core::AppResult;

/// Environment variable holding the concurrency limit, or `auto`.
pub const ENV_CONCURRENCY: &str = "TASK_POOL_CONCURRENCY";
/// Environment variable holding the fail-fast flag.
pub const ENV_FAIL_FAST: &str = "TASK_POOL_FAIL_FAST";
/// Environment variable holding the aggregate mode.
pub const ENV_MODE: &str = "TASK_POOL_MODE";
/// Environment variable holding the abort policy.
pub const ENV_ON_ABORT: &str = "TASK_POOL_ON_ABORT";

/// Shape of the value a successful run yields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateMode {
    /// Per-task elapsed time, indexed by factory position.
    #[default]
    Timings,
    /// A single "every task succeeded" flag.
    SuccessFlag,
}

/// What happens to in-flight operations when a run stops early.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortPolicy {
    /// Leave them running; their outcomes are discarded.
    #[default]
    Abandon,
    /// Abort them at their next suspension point.
    Cancel,
}

/// Pool configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum operations in flight at once.
    pub concurrency: usize,
    /// Stop the run on the first task failure.
    pub fail_fast: bool,
    /// Output shape.
    pub mode: AggregateMode,
    /// Treatment of in-flight operations on early termination.
    pub on_abort: AbortPolicy,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            concurrency: 2,
            fail_fast: true,
            mode: AggregateMode::Timings,
            on_abort: AbortPolicy::Abandon,
        }
    }
}

impl PoolConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.concurrency == 0 {
            return Err("concurrency must be greater than 0".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from `TASK_POOL_*` environment variables, loading
    /// a `.env` file first if one exists. Unset variables keep their defaults.
    pub fn from_env() -> AppResult<Self> {
        // A missing .env file is not an error.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let mut cfg = Self::default();

        if let Some(raw) = lookup(ENV_CONCURRENCY) {
            cfg.concurrency = parse_concurrency(&raw)
                .with_context(|| format!("{ENV_CONCURRENCY}={raw}"))?;
        }
        if let Some(raw) = lookup(ENV_FAIL_FAST) {
            cfg.fail_fast = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_FAIL_FAST}={raw}"))?;
        }
        if let Some(raw) = lookup(ENV_MODE) {
            cfg.mode = parse_variant(&raw).with_context(|| format!("{ENV_MODE}={raw}"))?;
        }
        if let Some(raw) = lookup(ENV_ON_ABORT) {
            cfg.on_abort = parse_variant(&raw).with_context(|| format!("{ENV_ON_ABORT}={raw}"))?;
        }

        cfg.validate().map_err(|e| anyhow!(e))?;
        Ok(cfg)
    }
}

/// `auto` resolves to the number of logical CPUs.
fn parse_concurrency(raw: &str) -> AppResult<usize> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("auto") {
        return Ok(num_cpus::get());
    }
    Ok(raw.parse()?)
}

fn parse_variant<T: DeserializeOwned>(raw: &str) -> AppResult<T> {
    Ok(serde_json::from_value(serde_json::Value::String(
        raw.trim().to_ascii_lowercase(),
    ))?)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_defaults() {
        let cfg = PoolConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, PoolConfig::default());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let cfg = PoolConfig::from_lookup(lookup(&[
            (ENV_CONCURRENCY, "8"),
            (ENV_FAIL_FAST, "false"),
            (ENV_MODE, "SUCCESS_FLAG"),
            (ENV_ON_ABORT, "cancel"),
        ]))
        .unwrap();
        assert_eq!(cfg.concurrency, 8);
        assert!(!cfg.fail_fast);
        assert_eq!(cfg.mode, AggregateMode::SuccessFlag);
        assert_eq!(cfg.on_abort, AbortPolicy::Cancel);
    }

    #[test]
    fn test_from_lookup_auto_concurrency() {
        let cfg = PoolConfig::from_lookup(lookup(&[(ENV_CONCURRENCY, "auto")])).unwrap();
        assert_eq!(cfg.concurrency, num_cpus::get());
    }

    #[test]
    fn test_from_lookup_rejects_zero_and_garbage() {
        assert!(PoolConfig::from_lookup(lookup(&[(ENV_CONCURRENCY, "0")])).is_err());
        assert!(PoolConfig::from_lookup(lookup(&[(ENV_CONCURRENCY, "-1")])).is_err());
        assert!(PoolConfig::from_lookup(lookup(&[(ENV_MODE, "fastest")])).is_err());
    }
}
