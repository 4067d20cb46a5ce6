//! Core scheduling abstractions: observable operations and the task pool.

pub mod error;
pub mod observable;
pub mod pool;

pub use error::{AppResult, PoolError};
pub use observable::{
    IntoObservable, ObservableOperation, Observer, Settled, Settling, DROPPED_BEFORE_SETTLEMENT,
};
pub use pool::{PoolOutcome, RunStats, Spawn, TaskPool};
