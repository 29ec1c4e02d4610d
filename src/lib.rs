//! # Tally
//!
//! One-shot completion notifiers for observing test suite outcomes.
//!
//! A [`Completion`] holds the eventual pass/fail outcome of some work. The
//! worker resolves it exactly once; any number of observers, on any thread,
//! register handlers before or after that and each handler runs exactly once.
//! [`TestCompletion`] specializes it to a whole test suite.
//!
//! ## Quick Start
//!
//! ```
//! use tally::prelude::*;
//!
//! let suite = TestCompletion::new("the_test_suite");
//! suite.on_complete(|outcome| {
//!     assert!(outcome.is_succeeded());
//! });
//!
//! let mut report = SuiteReport::new("the_test_suite");
//! report.record_pass();
//! suite.finish(&report)?;
//!
//! // Late observers see the fixed outcome immediately
//! suite.on_complete(|outcome| assert!(outcome.cause().is_none()));
//! # Ok::<(), tally::Error>(())
//! ```
//!
//! ## Layers
//!
//! - [`tally_core`] - the generic completion primitive and bridge handles
//! - [`tally_suite`] - suite reports and [`TestCompletion`]

#![warn(missing_docs)]

mod error;

pub mod prelude;

pub use error::{Error, Result};

// Re-export the layers
pub use tally_core::{
    BridgeHandler, Cause, Completion, CompletionBuilder, CompletionError, CompletionHandle,
    CompletionState, DelegateHandle, Outcome,
};
pub use tally_suite::{
    ProblemKind, SuiteFailure, SuiteReport, TestCompletion, TestCompletionBuilder, TestProblem,
    DEFAULT_AWAIT_TIMEOUT,
};
