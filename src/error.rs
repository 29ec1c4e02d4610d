//! Unified error types for Tally.
//!
//! This module provides a single error type over the completion and suite
//! layers so callers can use one `Result` across both.

use tally_core::{Cause, CompletionError};
use thiserror::Error;

/// All Tally errors.
///
/// A failed suite is not an error by itself: it is reported through the
/// completion's outcome. These variants cover misuse and waiting.
#[derive(Debug, Error)]
pub enum Error {
    /// Completion was resolved more than once
    #[error("already resolved: {0}")]
    AlreadyResolved(String),

    /// Outcome requested before the completion resolved
    #[error("pending: {0}")]
    Pending(String),

    /// Blocking wait gave up
    #[error("timed out: {0}")]
    Timeout(String),

    /// Every handle was dropped before resolution
    #[error("abandoned: {0}")]
    Abandoned(String),

    /// Waited-for work failed
    #[error("failed: {0}")]
    Failed(Cause),
}

/// Result type for Tally operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is a double resolution.
    pub fn is_already_resolved(&self) -> bool {
        matches!(self, Error::AlreadyResolved(_))
    }

    /// Check if a wait timed out.
    ///
    /// Timeouts are the only retryable error: the work may still finish.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }

    /// Check if this is a programmer error (misuse of the API).
    pub fn is_misuse(&self) -> bool {
        matches!(self, Error::AlreadyResolved(_) | Error::Pending(_))
    }

    /// Failure cause, if the waited-for work failed.
    pub fn cause(&self) -> Option<&Cause> {
        match self {
            Error::Failed(cause) => Some(cause),
            _ => None,
        }
    }
}

// Convert from completion errors
impl From<CompletionError> for Error {
    fn from(e: CompletionError) -> Self {
        match e {
            CompletionError::AlreadyResolved { .. } => Error::AlreadyResolved(e.to_string()),
            CompletionError::Pending { .. } => Error::Pending(e.to_string()),
            CompletionError::TimedOut { .. } => Error::Timeout(e.to_string()),
            CompletionError::Abandoned { .. } => Error::Abandoned(e.to_string()),
            CompletionError::Failed { cause, .. } => Error::Failed(cause),
        }
    }
}
