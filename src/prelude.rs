//! Convenient imports for Tally.
//!
//! ```
//! use tally::prelude::*;
//!
//! let suite = TestCompletion::new("smoke");
//! suite.on_complete(|outcome| println!("passed: {}", outcome.is_succeeded()));
//! suite.succeed()?;
//! # Ok::<(), tally::Error>(())
//! ```

// Completion primitive
pub use tally_core::{Cause, Completion, CompletionState, Outcome};

// Bridging
pub use tally_core::{CompletionHandle, DelegateHandle};

// Suites
pub use tally_suite::{SuiteFailure, SuiteReport, TestCompletion};

// Error handling
pub use crate::error::{Error, Result};
