//! Tokio runtime spawner implementation.

use std::fmt;
use std::future::Future;

use crate::config::PoolConfig;
use crate::core::{IntoObservable, PoolError, PoolOutcome, Spawn, TaskPool};

/// Tokio-based spawner that drives in-flight operations on a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioSpawner {
    handle: tokio::runtime::Handle,
}

impl TokioSpawner {
    /// Create a spawner from a tokio runtime handle.
    pub const fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Spawner for the runtime the caller is running on.
    pub fn try_current() -> Result<Self, PoolError> {
        tokio::runtime::Handle::try_current()
            .map(Self::new)
            .map_err(|e| PoolError::Runtime(e.to_string()))
    }

    /// The underlying runtime handle.
    pub const fn handle(&self) -> &tokio::runtime::Handle {
        &self.handle
    }
}

impl Spawn for TokioSpawner {
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        // Detached: an abandoned operation keeps running after the run returns.
        drop(self.handle.spawn(fut));
    }
}

/// Run `factories` on the current tokio runtime with `config`.
///
/// Configuration is validated before the runtime is looked up, so an invalid
/// concurrency is reported even outside a runtime.
pub async fn run_pool<I, F, O, T, E>(
    factories: I,
    config: PoolConfig,
) -> Result<PoolOutcome, PoolError>
where
    I: IntoIterator<Item = F>,
    F: FnOnce() -> O,
    O: IntoObservable<T, E>,
    T: Send + 'static,
    E: fmt::Display + Send + 'static,
{
    config.validate().map_err(PoolError::InvalidConfig)?;
    let pool = TaskPool::new(config, TokioSpawner::try_current()?)?;
    pool.run(factories).await
}
