//! Error types for pool operations.

use thiserror::Error;

/// Errors produced by a pool run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// Configuration rejected before any factory was invoked.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Fail-fast triggered by a task failure.
    #[error("pool aborted: task {origin} failed: {reason}")]
    Aborted {
        /// Backlog index of the task whose failure stopped the pool.
        origin: usize,
        /// Display form of the task's error.
        reason: String,
    },
    /// The external cancellation signal fired before the pool drained.
    #[error("pool cancelled")]
    Cancelled,
    /// No async runtime was available to drive the operations.
    #[error("runtime unavailable: {0}")]
    Runtime(String),
}

impl PoolError {
    /// Whether this error was raised before any factory ran.
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::InvalidConfig(_))
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
