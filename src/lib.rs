//! # Prometheus Task Pool
//!
//! A bounded-concurrency task pool for batches of asynchronous operations.
//!
//! Given an ordered list of task factories and a concurrency limit `N`, the
//! pool keeps at most `N` operations in flight, refills free slots from the
//! backlog in order as operations settle, and aggregates per-task outcomes
//! until every task has finished or fail-fast stops the run.
//!
//! ## Key Features
//!
//! - **Observable Operations**: any future resolving to a `Result` can be
//!   wrapped so its settlement, outcome and elapsed time are readable without
//!   awaiting it. Wrapping is idempotent.
//! - **Push-Based Completion**: settled operations announce themselves on a
//!   channel; the scheduler harvests every settled operation per wake-up.
//! - **Deterministic Output**: results are recorded by factory index, whatever
//!   the completion order.
//! - **Fail-Fast or Run-All**: stop on the first failure, or run everything and
//!   report failures as empty slots.
//! - **Abandon or Cancel**: choose whether operations still in flight at an
//!   early stop keep running or are aborted.
//! - **Runtime-Agnostic Core**: operations are driven through the [`core::Spawn`]
//!   trait; a Tokio adapter ships behind the default `tokio-runtime` feature.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use prometheus_task_pool::config::{AggregateMode, PoolConfig};
//! use prometheus_task_pool::runtime::run_pool;
//!
//! let factories = [10u64, 20, 5, 15, 8].map(|ms| move || async move {
//!     tokio::time::sleep(Duration::from_millis(ms)).await;
//!     Ok::<_, String>(ms)
//! });
//!
//! let outcome = run_pool(factories, PoolConfig::default()).await?;
//! assert_eq!(outcome.timings().map(<[_]>::len), Some(5));
//! ```
//!
//! For complete examples, see `tests/task_pool_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions: observable operations and the task pool.
pub mod core;
/// Configuration models for task pools.
pub mod config;
/// Builders to construct task pools from configuration.
pub mod builders;
/// Runtime adapters that drive pool operations.
#[cfg(feature = "tokio-runtime")]
pub mod runtime;
/// Shared utilities.
pub mod util;
