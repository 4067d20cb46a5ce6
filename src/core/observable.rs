//! Observable operations: futures whose settlement can be queried without
//! awaiting or consuming them.
//!
//! An [`ObservableOperation`] pairs a boxed future with a shared settlement
//! record. The record moves from pending to exactly one terminal state the
//! first time the future completes, and every [`Observer`] cloned from the
//! operation reads the same record.
//!
//! ```rust,ignore
//! use prometheus_task_pool::core::ObservableOperation;
//!
//! let op = ObservableOperation::wrap(async { Ok::<_, String>(42) }, 0);
//! let observer = op.observer();
//! assert!(!observer.is_settled());
//!
//! assert_eq!(op.await, Ok(42));
//! assert!(observer.is_succeeded());
//! ```

use std::fmt;
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;

/// Failure reason recorded for an operation dropped before it completed.
pub const DROPPED_BEFORE_SETTLEMENT: &str = "dropped before settlement";

/// Terminal state of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settled {
    /// The operation resolved to `Ok`.
    Succeeded {
        /// Time from invocation to settlement.
        elapsed: Duration,
    },
    /// The operation resolved to `Err`, or was dropped while pending.
    Failed {
        /// Time from invocation to settlement.
        elapsed: Duration,
        /// Display form of the error.
        reason: String,
    },
}

impl Settled {
    /// Time from invocation to settlement.
    pub const fn elapsed(&self) -> Duration {
        match self {
            Self::Succeeded { elapsed } | Self::Failed { elapsed, .. } => *elapsed,
        }
    }
}

#[derive(Debug)]
struct Settlement {
    origin: usize,
    started_at: Instant,
    outcome: Mutex<Option<Settled>>,
}

impl Settlement {
    fn new(origin: usize) -> Self {
        Self {
            origin,
            started_at: Instant::now(),
            outcome: Mutex::new(None),
        }
    }

    /// One-shot transition out of pending. Returns `false` if already settled.
    fn settle(&self, failure: Option<String>) -> bool {
        let mut outcome = self.outcome.lock();
        if outcome.is_some() {
            return false;
        }
        let elapsed = self.started_at.elapsed();
        *outcome = Some(match failure {
            None => Settled::Succeeded { elapsed },
            Some(reason) => Settled::Failed { elapsed, reason },
        });
        true
    }
}

/// Read-only handle onto an operation's settlement record.
///
/// Cloning an observer is cheap; all clones see the same record.
#[derive(Debug, Clone)]
pub struct Observer {
    state: Arc<Settlement>,
}

impl Observer {
    fn new(origin: usize) -> Self {
        Self {
            state: Arc::new(Settlement::new(origin)),
        }
    }

    /// Whether the operation has reached a terminal state.
    pub fn is_settled(&self) -> bool {
        self.state.outcome.lock().is_some()
    }

    /// Whether the operation settled successfully.
    pub fn is_succeeded(&self) -> bool {
        matches!(*self.state.outcome.lock(), Some(Settled::Succeeded { .. }))
    }

    /// Whether the operation settled with a failure.
    pub fn is_failed(&self) -> bool {
        matches!(*self.state.outcome.lock(), Some(Settled::Failed { .. }))
    }

    /// Time from invocation to settlement; `None` while pending.
    pub fn elapsed(&self) -> Option<Duration> {
        self.state.outcome.lock().as_ref().map(Settled::elapsed)
    }

    /// Failure reason, if the operation failed.
    pub fn failure(&self) -> Option<String> {
        match &*self.state.outcome.lock() {
            Some(Settled::Failed { reason, .. }) => Some(reason.clone()),
            _ => None,
        }
    }

    /// Snapshot of the terminal state; `None` while pending.
    pub fn settled(&self) -> Option<Settled> {
        self.state.outcome.lock().clone()
    }

    /// Index of the factory that produced the operation.
    pub fn origin(&self) -> usize {
        self.state.origin
    }

    /// Instant the operation was wrapped.
    pub fn started_at(&self) -> Instant {
        self.state.started_at
    }

    /// Whether both observers watch the same operation.
    pub fn same_operation(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    /// Settle as failed if still pending. Used when the driving task goes away.
    pub(crate) fn abandon(&self) -> bool {
        self.state.settle(Some(DROPPED_BEFORE_SETTLEMENT.to_string()))
    }
}

/// An asynchronous operation whose settlement can be queried synchronously.
///
/// Awaiting the operation yields the wrapped future's output unchanged, so a
/// failure is still delivered to the awaiter after it has been recorded.
pub struct ObservableOperation<T, E> {
    inner: BoxFuture<'static, Result<T, E>>,
    observer: Observer,
}

impl<T, E> ObservableOperation<T, E> {
    /// Wrap an operation, stamping it with `origin` and starting its clock.
    ///
    /// Wrapping an operation that is already observable returns it untouched,
    /// keeping its original origin and start time.
    pub fn wrap<O>(operation: O, origin: usize) -> Self
    where
        O: IntoObservable<T, E>,
    {
        operation.into_observable(origin)
    }

    /// A detached observer for this operation.
    pub fn observer(&self) -> Observer {
        self.observer.clone()
    }

    /// See [`Observer::is_settled`].
    pub fn is_settled(&self) -> bool {
        self.observer.is_settled()
    }

    /// See [`Observer::is_succeeded`].
    pub fn is_succeeded(&self) -> bool {
        self.observer.is_succeeded()
    }

    /// See [`Observer::is_failed`].
    pub fn is_failed(&self) -> bool {
        self.observer.is_failed()
    }

    /// See [`Observer::elapsed`].
    pub fn elapsed(&self) -> Option<Duration> {
        self.observer.elapsed()
    }

    /// See [`Observer::origin`].
    pub fn origin(&self) -> usize {
        self.observer.origin()
    }
}

impl<T, E> fmt::Debug for ObservableOperation<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableOperation")
            .field("origin", &self.observer.origin())
            .field("settled", &self.observer.settled())
            .finish_non_exhaustive()
    }
}

impl<T, E> IntoFuture for ObservableOperation<T, E>
where
    E: fmt::Display,
{
    type Output = Result<T, E>;
    type IntoFuture = Settling<T, E>;

    fn into_future(self) -> Self::IntoFuture {
        Settling {
            inner: Some(self.inner),
            observer: self.observer,
        }
    }
}

/// Conversion into an [`ObservableOperation`].
///
/// Implemented for every `Send` future resolving to a `Result`, and for
/// `ObservableOperation` itself as the identity.
pub trait IntoObservable<T, E> {
    /// Convert, using `origin` only if a new wrapper has to be created.
    fn into_observable(self, origin: usize) -> ObservableOperation<T, E>;
}

impl<F, T, E> IntoObservable<T, E> for F
where
    F: Future<Output = Result<T, E>> + Send + 'static,
    T: 'static,
    E: 'static,
{
    fn into_observable(self, origin: usize) -> ObservableOperation<T, E> {
        ObservableOperation {
            inner: self.boxed(),
            observer: Observer::new(origin),
        }
    }
}

impl<T, E> IntoObservable<T, E> for ObservableOperation<T, E> {
    fn into_observable(self, _origin: usize) -> Self {
        self
    }
}

/// Future returned by awaiting an [`ObservableOperation`].
///
/// Records the outcome into the settlement record before yielding it. If
/// dropped while pending, the operation is recorded as failed with
/// [`DROPPED_BEFORE_SETTLEMENT`].
pub struct Settling<T, E> {
    inner: Option<BoxFuture<'static, Result<T, E>>>,
    observer: Observer,
}

impl<T, E> Settling<T, E> {
    /// A detached observer for the operation being driven.
    pub fn observer(&self) -> Observer {
        self.observer.clone()
    }
}

impl<T, E> Future for Settling<T, E>
where
    E: fmt::Display,
{
    type Output = Result<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let Some(inner) = self.inner.as_mut() else {
            panic!("`Settling` polled after completion");
        };
        let output = match inner.poll_unpin(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(output) => output,
        };
        self.inner = None;
        let failure = output.as_ref().err().map(ToString::to_string);
        self.observer.state.settle(failure);
        Poll::Ready(output)
    }
}

impl<T, E> Drop for Settling<T, E> {
    fn drop(&mut self) {
        if self.inner.is_some() {
            self.observer.abandon();
        }
    }
}

impl<T, E> fmt::Debug for Settling<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settling")
            .field("origin", &self.observer.origin())
            .field("polling", &self.inner.is_some())
            .finish()
    }
}
