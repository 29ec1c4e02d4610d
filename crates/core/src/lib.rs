//! Completion primitives for tally
//!
//! This crate implements the one-shot outcome notifier:
//! - Completion: exactly-once resolution with ordered handler delivery
//! - Outcome / CompletionState: terminal results and lifecycle states
//! - Cause: opaque, identity-preserving failure values
//! - CompletionHandle / DelegateHandle: observe-only bridge surface

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cause;
pub mod completion;
pub mod error;
pub mod handle;
pub mod state;

pub use cause::Cause;
pub use completion::{Completion, CompletionBuilder};
pub use error::{CompletionError, Result};
pub use handle::{BridgeHandler, CompletionHandle, DelegateHandle};
pub use state::{CompletionState, Outcome};
