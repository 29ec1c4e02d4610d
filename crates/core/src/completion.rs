//! One-shot completion with exactly-once handler delivery
//!
//! A [`Completion`] is created pending by whoever is about to run some work,
//! resolved exactly once by that owner, and observed by any number of
//! handlers registered from any thread.
//!
//! ## Delivery Rules
//!
//! ```text
//! on_complete while Pending            -> queued, run by the resolving thread
//! on_complete while resolver delivers  -> queued behind in-flight handlers
//! on_complete after delivery finished  -> run synchronously before returning
//! ```
//!
//! Handlers always run in registration order and never under the lock, so a
//! handler may call back into the same completion. A second `succeed`/`fail`
//! returns [`CompletionError::AlreadyResolved`] and changes nothing.
//!
//! ## Thread Safety
//!
//! The state transition and the handler queue share one mutex. The resolver
//! flips the state and marks delivery in progress in a single critical
//! section, then pops handlers one at a time, so a registration racing with
//! resolution is either drained by the resolver or sees delivery finished and
//! runs itself. No handler is lost and none runs twice.

use crate::cause::Cause;
use crate::error::{CompletionError, Result};
use crate::state::{CompletionState, Outcome};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, trace, warn};

/// Source of default labels ("completion-1", "completion-2", ...)
static NEXT_COMPLETION_ID: AtomicU64 = AtomicU64::new(1);

type Handler<T> = Box<dyn FnOnce(&Outcome<T>) + Send>;

enum Stage<T> {
    Pending,
    Resolved(Arc<Outcome<T>>),
}

struct Slot<T> {
    stage: Stage<T>,
    /// Registered but not yet delivered handlers, in registration order
    handlers: VecDeque<Handler<T>>,
    /// Set by the resolver until the handler queue has been drained
    delivering: bool,
}

struct Shared<T> {
    label: String,
    slot: Mutex<Slot<T>>,
    /// Signalled once on resolution, for blocking waiters
    resolved: Condvar,
}

impl<T> Drop for Shared<T> {
    fn drop(&mut self) {
        let slot = self.slot.get_mut();
        if matches!(slot.stage, Stage::Pending) && !slot.handlers.is_empty() {
            debug!(
                label = %self.label,
                handlers = slot.handlers.len(),
                "Completion dropped while pending; handlers will never run"
            );
        }
    }
}

/// Eventual, exactly-once outcome of a unit of work
///
/// `Completion` is a handle: clones share the same state, so the resolver can
/// keep one clone while observers hold others.
///
/// # Example
///
/// ```
/// use tally_core::Completion;
///
/// let completion: Completion<()> = Completion::new();
/// completion.on_complete(|outcome| assert!(outcome.is_succeeded()));
/// completion.succeed(()).unwrap();
///
/// // Already resolved: the handler runs before on_complete returns
/// completion.on_complete(|outcome| assert!(outcome.cause().is_none()));
/// assert!(completion.succeed(()).is_err());
/// ```
pub struct Completion<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Completion<T> {
    fn clone(&self) -> Self {
        Completion {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Send + Sync + 'static> Completion<T> {
    /// Create a pending completion with a generated label
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a pending completion with the given label
    ///
    /// The label only appears in logs and error messages.
    pub fn labeled(label: impl Into<String>) -> Self {
        Self::builder().label(label).build()
    }

    /// Create a completion in an explicit initial state
    ///
    /// A completion built as `Succeeded` or `Failed` is already terminal:
    /// every handler registered on it runs immediately and any resolution
    /// attempt is rejected.
    pub fn with_state(state: CompletionState<T>) -> Self {
        Self::builder().state(state).build()
    }

    /// Create a builder for a labeled or pre-resolved completion
    pub fn builder() -> CompletionBuilder<T> {
        CompletionBuilder::new()
    }

    /// Label used in logs and errors
    pub fn label(&self) -> &str {
        &self.shared.label
    }

    /// Register a handler for the outcome
    ///
    /// The handler is invoked exactly once:
    /// - synchronously, before this call returns, if the outcome is already
    ///   known and fully delivered
    /// - otherwise on the resolving thread, after every handler registered
    ///   before it
    ///
    /// A panicking handler is logged and skipped; it does not prevent the
    /// other handlers from running.
    pub fn on_complete<F>(&self, handler: F)
    where
        F: FnOnce(&Outcome<T>) + Send + 'static,
    {
        let mut slot = self.shared.slot.lock();
        let ready = match (&slot.stage, slot.delivering) {
            (Stage::Resolved(outcome), false) => Some(Arc::clone(outcome)),
            _ => None,
        };
        match ready {
            Some(outcome) => {
                drop(slot);
                self.invoke(handler, &outcome);
            }
            None => {
                slot.handlers.push_back(Box::new(handler));
                trace!(
                    label = %self.shared.label,
                    queued = slot.handlers.len(),
                    "Handler queued"
                );
            }
        }
    }

    /// Register a handler that only runs on success
    pub fn on_success<F>(&self, handler: F)
    where
        F: FnOnce(&T) + Send + 'static,
    {
        self.on_complete(move |outcome| {
            if let Outcome::Succeeded(value) = outcome {
                handler(value);
            }
        });
    }

    /// Register a handler that only runs on failure
    pub fn on_failure<F>(&self, handler: F)
    where
        F: FnOnce(&Cause) + Send + 'static,
    {
        self.on_complete(move |outcome| {
            if let Outcome::Failed(cause) = outcome {
                handler(cause);
            }
        });
    }

    /// Resolve as succeeded
    ///
    /// # Errors
    /// [`CompletionError::AlreadyResolved`] if the completion is terminal.
    pub fn succeed(&self, value: T) -> Result<()> {
        self.complete(Outcome::Succeeded(value))
    }

    /// Resolve as failed
    ///
    /// The cause is handed to observers verbatim.
    ///
    /// # Errors
    /// [`CompletionError::AlreadyResolved`] if the completion is terminal.
    pub fn fail(&self, cause: impl Into<Cause>) -> Result<()> {
        self.complete(Outcome::Failed(cause.into()))
    }

    /// Resolve with an outcome
    ///
    /// The first call wins. Later calls return
    /// [`CompletionError::AlreadyResolved`], leave the stored outcome alone,
    /// and never re-run handlers.
    ///
    /// Queued handlers run on the calling thread before this returns.
    pub fn complete(&self, outcome: Outcome<T>) -> Result<()> {
        let attempted = outcome.as_str();
        let outcome = Arc::new(outcome);

        let mut slot = self.shared.slot.lock();
        let existing = match &slot.stage {
            Stage::Pending => None,
            Stage::Resolved(existing) => Some(existing.as_str()),
        };
        if let Some(existing) = existing {
            let err = CompletionError::AlreadyResolved {
                label: self.shared.label.clone(),
                existing,
                attempted,
            };
            drop(slot);
            warn!(label = %self.shared.label, error = %err, "Double resolution rejected");
            return Err(err);
        }

        slot.stage = Stage::Resolved(Arc::clone(&outcome));
        slot.delivering = true;
        debug!(
            label = %self.shared.label,
            outcome = attempted,
            handlers = slot.handlers.len(),
            "Completion resolved"
        );
        drop(slot);
        self.shared.resolved.notify_all();

        self.deliver(&outcome);
        Ok(())
    }

    /// Forward this completion's outcome into `target`
    ///
    /// When this completion resolves, `target` is resolved with a clone of the
    /// same outcome (failure causes keep their identity). If `target` has been
    /// resolved by someone else in the meantime, the forwarded outcome is
    /// dropped and logged.
    pub fn resolve(&self, target: &Completion<T>)
    where
        T: Clone,
    {
        let target = target.clone();
        self.on_complete(move |outcome| {
            if let Err(err) = target.complete(outcome.clone()) {
                debug!(label = %target.label(), error = %err, "Forwarded outcome dropped");
            }
        });
    }

    /// Whether the completion has left the pending state
    pub fn is_completed(&self) -> bool {
        matches!(self.shared.slot.lock().stage, Stage::Resolved(_))
    }

    /// Whether the completion succeeded
    ///
    /// Returns `false` while pending. Only a terminal completion ever has
    /// exactly one of `succeeded()` and `failed()` returning `true`.
    pub fn succeeded(&self) -> bool {
        self.with_outcome(|outcome| outcome.is_succeeded())
            .unwrap_or(false)
    }

    /// Whether the completion failed
    ///
    /// Returns `false` while pending.
    pub fn failed(&self) -> bool {
        self.with_outcome(|outcome| outcome.is_failed())
            .unwrap_or(false)
    }

    /// Failure cause; `None` while pending or after success
    pub fn cause(&self) -> Option<Cause> {
        self.with_outcome(|outcome| outcome.cause().cloned())
            .flatten()
    }

    /// Snapshot of the outcome, `None` while pending
    pub fn outcome(&self) -> Option<Outcome<T>>
    where
        T: Clone,
    {
        self.with_outcome(Outcome::clone)
    }

    /// Snapshot of the outcome
    ///
    /// # Errors
    /// [`CompletionError::Pending`] while unresolved.
    pub fn try_outcome(&self) -> Result<Outcome<T>>
    where
        T: Clone,
    {
        self.outcome().ok_or_else(|| CompletionError::Pending {
            label: self.shared.label.clone(),
        })
    }

    /// Success value, `None` while pending or after failure
    pub fn value(&self) -> Option<T>
    where
        T: Clone,
    {
        self.with_outcome(|outcome| outcome.value().cloned())
            .flatten()
    }

    /// Snapshot of the lifecycle state
    pub fn state(&self) -> CompletionState<T>
    where
        T: Clone,
    {
        match self.outcome() {
            None => CompletionState::Pending,
            Some(outcome) => outcome.into(),
        }
    }

    /// Block the calling thread until resolved or `timeout` elapses
    ///
    /// Does not wait for handlers to finish running.
    ///
    /// # Errors
    /// [`CompletionError::TimedOut`] if still pending after `timeout`.
    pub fn await_outcome(&self, timeout: Duration) -> Result<Outcome<T>>
    where
        T: Clone,
    {
        let deadline = Instant::now().checked_add(timeout);
        let resolved = {
            let mut slot = self.shared.slot.lock();
            loop {
                if let Stage::Resolved(outcome) = &slot.stage {
                    break Arc::clone(outcome);
                }
                match deadline {
                    Some(deadline) => {
                        if self.shared.resolved.wait_until(&mut slot, deadline).timed_out() {
                            if let Stage::Resolved(outcome) = &slot.stage {
                                break Arc::clone(outcome);
                            }
                            return Err(CompletionError::TimedOut {
                                label: self.shared.label.clone(),
                                timeout,
                            });
                        }
                    }
                    // Deadline past Instant's range: effectively unbounded
                    None => self.shared.resolved.wait(&mut slot),
                }
            }
        };
        // Clone outside the lock
        Ok((*resolved).clone())
    }

    /// Block until resolved and return the success value
    ///
    /// # Errors
    /// - [`CompletionError::TimedOut`] if still pending after `timeout`
    /// - [`CompletionError::Failed`] carrying the cause if the work failed
    pub fn await_success(&self, timeout: Duration) -> Result<T>
    where
        T: Clone,
    {
        match self.await_outcome(timeout)? {
            Outcome::Succeeded(value) => Ok(value),
            Outcome::Failed(cause) => Err(CompletionError::Failed {
                label: self.shared.label.clone(),
                cause,
            }),
        }
    }

    /// Wait for the outcome without blocking a thread
    ///
    /// The returned future does not keep the completion alive.
    ///
    /// # Errors
    /// [`CompletionError::Abandoned`] if every handle to the completion is
    /// dropped before it resolves.
    #[cfg(feature = "async")]
    pub fn wait(&self) -> impl std::future::Future<Output = Result<Outcome<T>>>
    where
        T: Clone,
    {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.on_complete(move |outcome| {
            // Receiver gone means the waiter lost interest
            let _ = tx.send(outcome.clone());
        });
        let label = self.shared.label.clone();
        async move { rx.await.map_err(|_| CompletionError::Abandoned { label }) }
    }

    /// Applies `f` with the lock released, so `f` (and `T::clone`) may read
    /// this completion again.
    fn with_outcome<R>(&self, f: impl FnOnce(&Outcome<T>) -> R) -> Option<R> {
        self.resolved_outcome().map(|outcome| f(&outcome))
    }

    fn resolved_outcome(&self) -> Option<Arc<Outcome<T>>> {
        match &self.shared.slot.lock().stage {
            Stage::Pending => None,
            Stage::Resolved(outcome) => Some(Arc::clone(outcome)),
        }
    }

    /// Drain queued handlers on the resolving thread
    fn deliver(&self, outcome: &Outcome<T>) {
        loop {
            let next = {
                let mut slot = self.shared.slot.lock();
                match slot.handlers.pop_front() {
                    Some(handler) => handler,
                    None => {
                        slot.delivering = false;
                        return;
                    }
                }
            };
            self.invoke(next, outcome);
        }
    }

    fn invoke<F>(&self, handler: F, outcome: &Outcome<T>)
    where
        F: FnOnce(&Outcome<T>),
    {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| handler(outcome))) {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            error!(label = %self.shared.label, panic = %message, "Completion handler panicked");
        }
    }
}

impl<T: Send + Sync + 'static> Default for Completion<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Completion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.shared.slot.lock();
        let stage = match &slot.stage {
            Stage::Pending => "Pending",
            Stage::Resolved(outcome) => outcome.as_str(),
        };
        f.debug_struct("Completion")
            .field("label", &self.shared.label)
            .field("state", &stage)
            .field("queued_handlers", &slot.handlers.len())
            .finish()
    }
}

/// Builder for completion configuration.
///
/// # Example
///
/// ```
/// use tally_core::{Cause, Completion, CompletionState};
///
/// let done: Completion<u32> = Completion::builder()
///     .label("checksum")
///     .state(CompletionState::Succeeded(42))
///     .build();
/// assert_eq!(done.value(), Some(42));
///
/// let broken: Completion<()> = Completion::builder()
///     .state(CompletionState::Failed(Cause::msg("no disk")))
///     .build();
/// assert!(broken.failed());
/// ```
pub struct CompletionBuilder<T> {
    label: Option<String>,
    state: CompletionState<T>,
}

impl<T: Send + Sync + 'static> CompletionBuilder<T> {
    /// Create a builder for a pending, auto-labeled completion
    pub fn new() -> Self {
        CompletionBuilder {
            label: None,
            state: CompletionState::Pending,
        }
    }

    /// Set the label used in logs and errors
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the initial state
    pub fn state(mut self, state: CompletionState<T>) -> Self {
        self.state = state;
        self
    }

    /// Build the completion
    pub fn build(self) -> Completion<T> {
        let label = self.label.unwrap_or_else(|| {
            format!(
                "completion-{}",
                NEXT_COMPLETION_ID.fetch_add(1, Ordering::Relaxed)
            )
        });
        let stage = match self.state {
            CompletionState::Pending => Stage::Pending,
            CompletionState::Succeeded(value) => Stage::Resolved(Arc::new(Outcome::Succeeded(value))),
            CompletionState::Failed(cause) => Stage::Resolved(Arc::new(Outcome::Failed(cause))),
        };
        if let Stage::Resolved(outcome) = &stage {
            debug!(label = %label, outcome = outcome.as_str(), "Completion created resolved");
        }
        Completion {
            shared: Arc::new(Shared {
                label,
                slot: Mutex::new(Slot {
                    stage,
                    handlers: VecDeque::new(),
                    delivering: false,
                }),
                resolved: Condvar::new(),
            }),
        }
    }
}

impl<T: Send + Sync + 'static> Default for CompletionBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
