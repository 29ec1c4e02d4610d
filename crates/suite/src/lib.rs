//! Test suite outcomes for tally
//!
//! This crate specializes the completion primitive to whole test suites:
//! - TestCompletion: passes iff every test in the suite passed
//! - SuiteReport: run/failure/error tally kept by the execution engine
//! - SuiteFailure: aggregated failure cause handed to observers

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod report;
pub mod test_completion;

pub use report::{ProblemKind, SuiteFailure, SuiteReport, TestProblem};
pub use test_completion::{TestCompletion, TestCompletionBuilder, DEFAULT_AWAIT_TIMEOUT};
