//! Completion states and outcomes
//!
//! ```text
//! Pending ──┬──► Succeeded(T)
//!           └──► Failed(Cause)
//! ```
//!
//! Both terminal states are final. The failure cause lives inside the
//! `Failed` variant, so "failed without a cause" and "succeeded with a cause"
//! cannot be represented.

use crate::cause::Cause;
use std::fmt;

/// Terminal outcome of a completion
#[derive(Debug, Clone)]
pub enum Outcome<T> {
    /// The monitored work succeeded
    Succeeded(T),
    /// The monitored work failed with a cause
    Failed(Cause),
}

impl<T> Outcome<T> {
    /// Check if this outcome is a success
    pub fn is_succeeded(&self) -> bool {
        matches!(self, Outcome::Succeeded(_))
    }

    /// Check if this outcome is a failure
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    /// Failure cause, if failed
    pub fn cause(&self) -> Option<&Cause> {
        match self {
            Outcome::Succeeded(_) => None,
            Outcome::Failed(cause) => Some(cause),
        }
    }

    /// Success value, if succeeded
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Succeeded(value) => Some(value),
            Outcome::Failed(_) => None,
        }
    }

    /// Convert into a standard `Result`
    pub fn into_result(self) -> Result<T, Cause> {
        match self {
            Outcome::Succeeded(value) => Ok(value),
            Outcome::Failed(cause) => Err(cause),
        }
    }

    /// Get string representation of the outcome kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Succeeded(_) => "Succeeded",
            Outcome::Failed(_) => "Failed",
        }
    }
}

impl<T> From<Result<T, Cause>> for Outcome<T> {
    fn from(result: Result<T, Cause>) -> Self {
        match result {
            Ok(value) => Outcome::Succeeded(value),
            Err(cause) => Outcome::Failed(cause),
        }
    }
}

/// Lifecycle state of a completion
///
/// Also used to construct a completion in a known state, see
/// [`Completion::with_state`](crate::Completion::with_state).
#[derive(Debug, Clone)]
pub enum CompletionState<T> {
    /// Not yet resolved
    Pending,
    /// Resolved successfully
    Succeeded(T),
    /// Resolved as failed
    Failed(Cause),
}

impl<T> CompletionState<T> {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CompletionState::Pending)
    }

    /// Terminal outcome, or `None` while pending
    pub fn outcome(&self) -> Option<Outcome<&T>> {
        match self {
            CompletionState::Pending => None,
            CompletionState::Succeeded(value) => Some(Outcome::Succeeded(value)),
            CompletionState::Failed(cause) => Some(Outcome::Failed(cause.clone())),
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionState::Pending => "Pending",
            CompletionState::Succeeded(_) => "Succeeded",
            CompletionState::Failed(_) => "Failed",
        }
    }
}

impl<T> From<Outcome<T>> for CompletionState<T> {
    fn from(outcome: Outcome<T>) -> Self {
        match outcome {
            Outcome::Succeeded(value) => CompletionState::Succeeded(value),
            Outcome::Failed(cause) => CompletionState::Failed(cause),
        }
    }
}

impl<T> fmt::Display for CompletionState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl<T> fmt::Display for Outcome<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Succeeded(_) => write!(f, "Succeeded"),
            Outcome::Failed(cause) => write!(f, "Failed: {}", cause),
        }
    }
}
