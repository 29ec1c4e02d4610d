//! Opaque failure causes
//!
//! A [`Cause`] is whatever the resolver hands to [`Completion::fail`]. The
//! completion never looks inside it: observers receive the very same instance
//! (see [`Cause::ptr_eq`]) and may recover the concrete error with
//! [`Cause::downcast_ref`].
//!
//! [`Completion::fail`]: crate::Completion::fail

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Plain-text cause for resolvers that only have a message.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct MessageCause(String);

/// Failure cause carried by a failed completion.
///
/// Cloning is cheap: all clones share one underlying error.
#[derive(Clone)]
pub struct Cause {
    inner: Arc<dyn StdError + Send + Sync + 'static>,
}

impl Cause {
    /// Wrap an error value as a cause
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Cause {
            inner: Arc::new(error),
        }
    }

    /// Create a cause from a message
    pub fn msg(message: impl fmt::Display) -> Self {
        Self::new(MessageCause(message.to_string()))
    }

    /// Borrow the underlying error
    pub fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.inner
    }

    /// Attempt to view the cause as a concrete error type
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }

    /// Check whether two causes are the same instance
    ///
    /// Two causes built separately from equal messages are NOT the same
    /// instance; clones of one cause are.
    pub fn ptr_eq(&self, other: &Cause) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner, f)
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.inner, f)
    }
}

// Lets a cause sit in an error chain; the wrapped error is transparent
impl StdError for Cause {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source()
    }
}

impl From<&str> for Cause {
    fn from(message: &str) -> Self {
        Cause::msg(message)
    }
}

impl From<String> for Cause {
    fn from(message: String) -> Self {
        Self::new(MessageCause(message))
    }
}

impl From<std::io::Error> for Cause {
    fn from(error: std::io::Error) -> Self {
        Cause::new(error)
    }
}

// Engines built on anyhow hand their errors over without re-wrapping
impl From<anyhow::Error> for Cause {
    fn from(error: anyhow::Error) -> Self {
        let boxed: Box<dyn StdError + Send + Sync + 'static> = error.into();
        Cause {
            inner: Arc::from(boxed),
        }
    }
}

impl From<Box<dyn StdError + Send + Sync + 'static>> for Cause {
    fn from(error: Box<dyn StdError + Send + Sync + 'static>) -> Self {
        Cause {
            inner: Arc::from(error),
        }
    }
}
