//! Error types for completion misuse
//!
//! A failed outcome is data, not an error: it reaches observers through the
//! handler argument or [`Completion::cause`](crate::Completion::cause). The
//! variants here signal programmer errors (double resolution, reading an
//! outcome too early) and the failure modes of blocking waits.

use crate::cause::Cause;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by completion operations
#[derive(Debug, Clone, Error)]
pub enum CompletionError {
    /// A second resolution was attempted; the first outcome stands
    #[error("completion {label} already resolved as {existing}, ignoring {attempted}")]
    AlreadyResolved {
        /// Completion label
        label: String,
        /// Outcome fixed by the winning resolution
        existing: &'static str,
        /// Outcome the rejected call tried to set
        attempted: &'static str,
    },

    /// The outcome was read before resolution
    #[error("completion {label} is still pending")]
    Pending {
        /// Completion label
        label: String,
    },

    /// A blocking wait gave up before resolution
    #[error("completion {label} not resolved within {timeout:?}")]
    TimedOut {
        /// Completion label
        label: String,
        /// How long the caller waited
        timeout: Duration,
    },

    /// Every handle was dropped before resolution
    #[error("completion {label} dropped before it was resolved")]
    Abandoned {
        /// Completion label
        label: String,
    },

    /// A wait for success observed a failure
    #[error("completion {label} failed: {cause}")]
    Failed {
        /// Completion label
        label: String,
        /// The failure cause, verbatim
        cause: Cause,
    },
}

impl CompletionError {
    /// Check if this is a double resolution
    pub fn is_already_resolved(&self) -> bool {
        matches!(self, CompletionError::AlreadyResolved { .. })
    }

    /// Check if a wait timed out
    pub fn is_timeout(&self) -> bool {
        matches!(self, CompletionError::TimedOut { .. })
    }

    /// Failure cause carried by the error, if any
    pub fn cause(&self) -> Option<&Cause> {
        match self {
            CompletionError::Failed { cause, .. } => Some(cause),
            _ => None,
        }
    }
}

/// Result type for completion operations
pub type Result<T> = std::result::Result<T, CompletionError>;
