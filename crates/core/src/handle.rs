//! Read-only completion handles for bridging across runtimes
//!
//! Observers that live in a different execution environment (a scripting
//! shim, an embedding host) should not see the concrete completion type, let
//! alone its write side. [`CompletionHandle`] is the object-safe surface they
//! get instead. It has two kinds of implementation:
//!
//! - native: [`Completion`] itself (and wrappers that forward to one)
//! - forwarding: [`DelegateHandle`], an opaque reference to a completion owned
//!   elsewhere, forwarded by identity
//!
//! Neither exposes `succeed`/`fail`: resolution stays with the owner.

use crate::cause::Cause;
use crate::completion::Completion;
use crate::state::Outcome;
use std::fmt;
use std::sync::Arc;

/// Handler shape used across the bridge: `(succeeded, cause)`
pub type BridgeHandler = Box<dyn FnOnce(bool, Option<Cause>) + Send>;

/// Object-safe, observe-only view of a completion
pub trait CompletionHandle: Send + Sync {
    /// Label used in logs and errors
    fn label(&self) -> &str;

    /// Whether the completion has left the pending state
    fn is_completed(&self) -> bool;

    /// Whether the completion succeeded (`false` while pending)
    fn succeeded(&self) -> bool;

    /// Whether the completion failed (`false` while pending)
    fn failed(&self) -> bool;

    /// Failure cause, if failed
    fn cause(&self) -> Option<Cause>;

    /// Register a handler, with the same delivery rules as
    /// [`Completion::on_complete`]
    fn subscribe(&self, handler: BridgeHandler);
}

impl<T: Send + Sync + 'static> CompletionHandle for Completion<T> {
    fn label(&self) -> &str {
        Completion::label(self)
    }

    fn is_completed(&self) -> bool {
        Completion::is_completed(self)
    }

    fn succeeded(&self) -> bool {
        Completion::succeeded(self)
    }

    fn failed(&self) -> bool {
        Completion::failed(self)
    }

    fn cause(&self) -> Option<Cause> {
        Completion::cause(self)
    }

    fn subscribe(&self, handler: BridgeHandler) {
        self.on_complete(move |outcome: &Outcome<T>| {
            handler(outcome.is_succeeded(), outcome.cause().cloned())
        });
    }
}

/// Opaque reference to a completion owned by another runtime
///
/// Clones refer to the same delegate; [`DelegateHandle::same_delegate`]
/// compares identity, not state.
#[derive(Clone)]
pub struct DelegateHandle {
    delegate: Arc<dyn CompletionHandle>,
}

impl DelegateHandle {
    /// Wrap a delegate
    pub fn new(delegate: Arc<dyn CompletionHandle>) -> Self {
        DelegateHandle { delegate }
    }

    /// Wrap a native completion
    pub fn from_completion<T: Send + Sync + 'static>(completion: Completion<T>) -> Self {
        Self::new(Arc::new(completion))
    }

    /// Register a `(succeeded, cause)` handler
    pub fn on_complete<F>(&self, handler: F)
    where
        F: FnOnce(bool, Option<Cause>) + Send + 'static,
    {
        self.delegate.subscribe(Box::new(handler));
    }

    /// Check whether two handles forward to the same delegate
    pub fn same_delegate(&self, other: &DelegateHandle) -> bool {
        // Compare data pointers only; vtables may differ across codegen units
        std::ptr::eq(
            Arc::as_ptr(&self.delegate) as *const (),
            Arc::as_ptr(&other.delegate) as *const (),
        )
    }
}

impl CompletionHandle for DelegateHandle {
    fn label(&self) -> &str {
        self.delegate.label()
    }

    fn is_completed(&self) -> bool {
        self.delegate.is_completed()
    }

    fn succeeded(&self) -> bool {
        self.delegate.succeeded()
    }

    fn failed(&self) -> bool {
        self.delegate.failed()
    }

    fn cause(&self) -> Option<Cause> {
        self.delegate.cause()
    }

    fn subscribe(&self, handler: BridgeHandler) {
        self.delegate.subscribe(handler);
    }
}

impl fmt::Debug for DelegateHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegateHandle")
            .field("label", &self.delegate.label())
            .field("completed", &self.delegate.is_completed())
            .finish()
    }
}
