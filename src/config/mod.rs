//! Configuration models for task pools.

pub mod pool;

pub use pool::{AbortPolicy, AggregateMode, PoolConfig};
