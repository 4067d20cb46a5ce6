//! Fluent construction of task pools.

use crate::config::{AbortPolicy, AggregateMode, PoolConfig};
use crate::core::{PoolError, Spawn, TaskPool};

/// Builder for [`TaskPool`]; validation happens in [`TaskPoolBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct TaskPoolBuilder {
    config: PoolConfig,
}

impl TaskPoolBuilder {
    /// Start from the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub const fn from_config(config: PoolConfig) -> Self {
        Self { config }
    }

    /// Maximum operations in flight at once.
    #[must_use]
    pub const fn concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency;
        self
    }

    /// One slot per logical CPU.
    #[must_use]
    pub fn concurrency_from_cpus(mut self) -> Self {
        self.config.concurrency = num_cpus::get();
        self
    }

    /// Stop on the first task failure.
    #[must_use]
    pub const fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.config.fail_fast = fail_fast;
        self
    }

    /// Output shape of a successful run.
    #[must_use]
    pub const fn mode(mut self, mode: AggregateMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Treatment of in-flight operations when a run stops early.
    #[must_use]
    pub const fn on_abort(mut self, policy: AbortPolicy) -> Self {
        self.config.on_abort = policy;
        self
    }

    /// Configuration assembled so far.
    pub const fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Validate and build the pool.
    pub fn build<S: Spawn>(self, spawner: S) -> Result<TaskPool<S>, PoolError> {
        TaskPool::new(self.config, spawner)
    }
}
