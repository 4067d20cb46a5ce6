//! Telemetry helpers for structured logging and tracing.

use tracing_subscriber::EnvFilter;

/// Filter applied when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "prometheus_task_pool=info";

/// Install an env-filtered fmt subscriber unless one is already set.
///
/// Pool runs log under a `task_pool_run` span carrying the run id; set
/// `RUST_LOG=prometheus_task_pool=debug` to see each invocation and harvest.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
