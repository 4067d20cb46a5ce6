//! Runtime adapters for driving pool operations.

pub mod tokio_spawner;

pub use tokio_spawner::{run_pool, TokioSpawner};
