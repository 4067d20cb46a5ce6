//! Bounded-concurrency task pool and its scheduling loop.

use std::collections::VecDeque;
use std::fmt;
use std::future::{Future, IntoFuture};
use std::time::Duration;

use futures::channel::mpsc::{self, UnboundedSender};
use futures::future::{AbortHandle, Abortable};
use futures::{FutureExt, StreamExt};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::{AbortPolicy, AggregateMode, PoolConfig};
use crate::core::{IntoObservable, ObservableOperation, Observer, PoolError, Settled};

/// Abstraction for spawning task execution on a runtime.
pub trait Spawn {
    /// Spawn a detached future.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Result of a pool run that drained its backlog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolOutcome {
    /// Per-task elapsed time indexed by factory position; `None` marks a task
    /// that did not complete successfully.
    Timings(Vec<Option<Duration>>),
    /// Whether every task succeeded.
    AllSucceeded(bool),
}

impl PoolOutcome {
    /// Per-task timings, if the run aggregated timings.
    pub fn timings(&self) -> Option<&[Option<Duration>]> {
        match self {
            Self::Timings(slots) => Some(slots),
            Self::AllSucceeded(_) => None,
        }
    }

    /// Consume the outcome into its timings.
    pub fn into_timings(self) -> Option<Vec<Option<Duration>>> {
        match self {
            Self::Timings(slots) => Some(slots),
            Self::AllSucceeded(_) => None,
        }
    }

    /// Whether every task succeeded. For timings, every slot must be filled.
    pub fn all_succeeded(&self) -> bool {
        match self {
            Self::Timings(slots) => slots.iter().all(Option::is_some),
            Self::AllSucceeded(ok) => *ok,
        }
    }
}

/// Counters collected over one run and logged when it ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Factories invoked.
    pub started: usize,
    /// Operations harvested as succeeded.
    pub succeeded: usize,
    /// Operations harvested as failed.
    pub failed: usize,
    /// Largest in-flight set observed.
    pub peak_in_flight: usize,
}

struct InFlight {
    slot: usize,
    observer: Observer,
    abort: AbortHandle,
}

struct PoolState<F> {
    backlog: VecDeque<(usize, F)>,
    in_flight: Vec<InFlight>,
    /// Empty unless the run aggregates timings.
    accumulator: Vec<Option<Duration>>,
    errors_seen: bool,
    stats: RunStats,
}

/// Sends the slot on the settlement channel when the driving task ends,
/// however it ends.
struct SettlementNotice {
    slot: usize,
    observer: Observer,
    notify: UnboundedSender<usize>,
}

impl Drop for SettlementNotice {
    fn drop(&mut self) {
        self.observer.abandon();
        // Receiver is gone once the run has returned.
        let _ = self.notify.unbounded_send(self.slot);
    }
}

/// Runs an ordered list of task factories with at most `concurrency`
/// operations in flight.
///
/// Each call to [`TaskPool::run`] owns its own backlog, in-flight set and
/// accumulator, so one pool can serve several runs concurrently.
///
/// ```rust,ignore
/// use prometheus_task_pool::builders::TaskPoolBuilder;
/// use prometheus_task_pool::runtime::TokioSpawner;
///
/// let pool = TaskPoolBuilder::new()
///     .concurrency(4)
///     .fail_fast(false)
///     .build(TokioSpawner::try_current()?)?;
///
/// let factories = urls.into_iter().map(|url| move || fetch(url));
/// let outcome = pool.run(factories).await?;
/// ```
#[derive(Debug, Clone)]
pub struct TaskPool<S> {
    config: PoolConfig,
    spawner: S,
}

impl<S> TaskPool<S>
where
    S: Spawn,
{
    /// Create a pool, rejecting invalid configuration.
    pub fn new(config: PoolConfig, spawner: S) -> Result<Self, PoolError> {
        config.validate().map_err(PoolError::InvalidConfig)?;
        Ok(Self { config, spawner })
    }

    /// Configuration this pool runs with.
    pub const fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Run every factory to completion, or until fail-fast aborts the run.
    pub async fn run<I, F, O, T, E>(&self, factories: I) -> Result<PoolOutcome, PoolError>
    where
        I: IntoIterator<Item = F>,
        F: FnOnce() -> O,
        O: IntoObservable<T, E>,
        T: Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        self.run_until(factories, futures::future::pending::<()>())
            .await
    }

    /// Like [`TaskPool::run`], but stops scheduling with
    /// [`PoolError::Cancelled`] as soon as `cancel` completes.
    ///
    /// In-flight operations are then abandoned or aborted according to the
    /// configured [`AbortPolicy`].
    pub async fn run_until<I, F, O, T, E, C>(
        &self,
        factories: I,
        cancel: C,
    ) -> Result<PoolOutcome, PoolError>
    where
        I: IntoIterator<Item = F>,
        F: FnOnce() -> O,
        O: IntoObservable<T, E>,
        T: Send + 'static,
        E: fmt::Display + Send + 'static,
        C: Future<Output = ()>,
    {
        let run_id = Uuid::new_v4();
        self.drive(factories, cancel)
            .instrument(tracing::info_span!("task_pool_run", %run_id))
            .await
    }

    async fn drive<I, F, O, T, E, C>(
        &self,
        factories: I,
        cancel: C,
    ) -> Result<PoolOutcome, PoolError>
    where
        I: IntoIterator<Item = F>,
        F: FnOnce() -> O,
        O: IntoObservable<T, E>,
        T: Send + 'static,
        E: fmt::Display + Send + 'static,
        C: Future<Output = ()>,
    {
        let backlog: VecDeque<(usize, F)> = factories.into_iter().enumerate().collect();
        let total = backlog.len();
        let accumulator = match self.config.mode {
            AggregateMode::Timings => vec![None; total],
            AggregateMode::SuccessFlag => Vec::new(),
        };
        let mut state = PoolState {
            backlog,
            in_flight: Vec::with_capacity(self.config.concurrency.min(total)),
            accumulator,
            errors_seen: false,
            stats: RunStats::default(),
        };

        tracing::info!(
            tasks = total,
            concurrency = self.config.concurrency,
            fail_fast = self.config.fail_fast,
            mode = ?self.config.mode,
            "pool run started"
        );

        let (notify, mut notices) = mpsc::unbounded::<usize>();
        let cancel = cancel.fuse();
        futures::pin_mut!(cancel);

        self.refill(&mut state, &notify);

        while !state.in_flight.is_empty() {
            futures::select_biased! {
                _ = notices.next() => {}
                () = cancel => {
                    tracing::warn!(
                        in_flight = state.in_flight.len(),
                        backlog = state.backlog.len(),
                        "cancellation requested, stopping pool"
                    );
                    self.release(&state.in_flight);
                    log_stats(&state.stats);
                    return Err(PoolError::Cancelled);
                }
            }
            // Several operations may have settled since the last pass.
            while let Ok(Some(_)) = notices.try_next() {}

            let (settled, pending): (Vec<InFlight>, Vec<InFlight>) =
                std::mem::take(&mut state.in_flight)
                    .into_iter()
                    .partition(|op| op.observer.is_settled());
            state.in_flight = pending;

            if let Some(failed) = settled.iter().find(|op| op.observer.is_failed()) {
                state.errors_seen = true;
                if self.config.fail_fast {
                    let reason = failed.observer.failure().unwrap_or_default();
                    tracing::warn!(
                        origin = failed.slot,
                        %reason,
                        in_flight = state.in_flight.len(),
                        backlog = state.backlog.len(),
                        "task failed, aborting pool"
                    );
                    state.stats.failed += settled.iter().filter(|op| op.observer.is_failed()).count();
                    self.release(&state.in_flight);
                    log_stats(&state.stats);
                    return Err(PoolError::Aborted {
                        origin: failed.slot,
                        reason,
                    });
                }
            }

            for op in settled {
                harvest(&mut state, &op);
            }
            self.refill(&mut state, &notify);
        }

        log_stats(&state.stats);
        Ok(match self.config.mode {
            AggregateMode::Timings => PoolOutcome::Timings(state.accumulator),
            AggregateMode::SuccessFlag => PoolOutcome::AllSucceeded(!state.errors_seen),
        })
    }

    /// Invoke factories from the front of the backlog until the in-flight set
    /// is full or the backlog is empty.
    fn refill<F, O, T, E>(&self, state: &mut PoolState<F>, notify: &UnboundedSender<usize>)
    where
        F: FnOnce() -> O,
        O: IntoObservable<T, E>,
        T: Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let slots = self
            .config
            .concurrency
            .saturating_sub(state.in_flight.len())
            .min(state.backlog.len());

        for (slot, factory) in state.backlog.drain(..slots) {
            let operation = ObservableOperation::wrap(factory(), slot);
            let observer = operation.observer();
            let (abort, registration) = AbortHandle::new_pair();
            let settling = Abortable::new(operation.into_future(), registration);
            let notice = SettlementNotice {
                slot,
                observer: observer.clone(),
                notify: notify.clone(),
            };

            tracing::debug!(origin = slot, "invoking task");
            self.spawner.spawn(async move {
                let _notice = notice;
                let _ = settling.await;
            });
            state.in_flight.push(InFlight {
                slot,
                observer,
                abort,
            });
        }

        state.stats.started += slots;
        state.stats.peak_in_flight = state.stats.peak_in_flight.max(state.in_flight.len());
    }

    /// Apply the abort policy to operations still in flight.
    fn release(&self, in_flight: &[InFlight]) {
        match self.config.on_abort {
            AbortPolicy::Abandon => {
                tracing::debug!(count = in_flight.len(), "abandoning in-flight operations");
            }
            AbortPolicy::Cancel => {
                tracing::debug!(count = in_flight.len(), "aborting in-flight operations");
                for op in in_flight {
                    op.abort.abort();
                }
            }
        }
    }
}

/// Record a settled operation into the pool state.
fn harvest<F>(state: &mut PoolState<F>, op: &InFlight) {
    match op.observer.settled() {
        Some(Settled::Succeeded { elapsed }) => {
            state.stats.succeeded += 1;
            if let Some(slot) = state.accumulator.get_mut(op.slot) {
                *slot = Some(elapsed);
            }
            tracing::debug!(origin = op.slot, ?elapsed, "task succeeded");
        }
        Some(Settled::Failed { elapsed, reason }) => {
            state.stats.failed += 1;
            tracing::warn!(origin = op.slot, ?elapsed, %reason, "task failed");
        }
        None => {}
    }
}

fn log_stats(stats: &RunStats) {
    tracing::info!(
        started = stats.started,
        succeeded = stats.succeeded,
        failed = stats.failed,
        peak_in_flight = stats.peak_in_flight,
        "pool run finished"
    );
}
