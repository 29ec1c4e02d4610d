//! Suite tallies and aggregated failures
//!
//! The execution engine records each test into a [`SuiteReport`] and hands the
//! finished report to [`TestCompletion::finish`](crate::TestCompletion::finish).
//! A report with any failure or error becomes a [`SuiteFailure`] cause.
//!
//! Failures are assertion failures; errors are anything else a test (or a
//! before/after hook) raised. The aggregation policy is "first problem wins":
//! the failure keeps counts for everything but the cause of the first one only.

use std::fmt;
use tally_core::Cause;
use thiserror::Error;

/// Kind of a recorded problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProblemKind {
    /// An assertion did not hold
    Failure,
    /// The test or hook raised an unexpected error
    Error,
}

impl ProblemKind {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ProblemKind::Failure => "failure",
            ProblemKind::Error => "error",
        }
    }
}

/// First problem seen while running a suite
#[derive(Debug, Clone)]
pub struct TestProblem {
    /// Test (or hook) name
    pub test: String,
    /// Failure or error
    pub kind: ProblemKind,
    /// What went wrong, verbatim
    pub cause: Cause,
}

/// Running tally of a suite execution
#[derive(Debug, Clone)]
pub struct SuiteReport {
    suite: String,
    run: u32,
    failures: u32,
    errors: u32,
    first_problem: Option<TestProblem>,
}

impl SuiteReport {
    /// Create an empty report
    pub fn new(suite: impl Into<String>) -> Self {
        SuiteReport {
            suite: suite.into(),
            run: 0,
            failures: 0,
            errors: 0,
            first_problem: None,
        }
    }

    /// Record a passing test
    pub fn record_pass(&mut self) {
        self.run = self.run.saturating_add(1);
    }

    /// Record a test whose assertions failed
    pub fn record_failure(&mut self, test: impl Into<String>, cause: impl Into<Cause>) {
        self.run = self.run.saturating_add(1);
        self.failures = self.failures.saturating_add(1);
        self.note_problem(test.into(), ProblemKind::Failure, cause.into());
    }

    /// Record a test that raised an error
    pub fn record_error(&mut self, test: impl Into<String>, cause: impl Into<Cause>) {
        self.run = self.run.saturating_add(1);
        self.errors = self.errors.saturating_add(1);
        self.note_problem(test.into(), ProblemKind::Error, cause.into());
    }

    /// Record an error raised by a before/after hook
    ///
    /// Hooks are not tests: the error counts but `run` does not move.
    pub fn record_hook_error(&mut self, hook: impl Into<String>, cause: impl Into<Cause>) {
        self.errors = self.errors.saturating_add(1);
        self.note_problem(hook.into(), ProblemKind::Error, cause.into());
    }

    fn note_problem(&mut self, test: String, kind: ProblemKind, cause: Cause) {
        if self.first_problem.is_none() {
            self.first_problem = Some(TestProblem { test, kind, cause });
        }
    }

    /// Suite name
    pub fn suite(&self) -> &str {
        &self.suite
    }

    /// Number of tests run
    pub fn run(&self) -> u32 {
        self.run
    }

    /// Number of assertion failures
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Number of errors
    pub fn errors(&self) -> u32 {
        self.errors
    }

    /// First recorded problem, if any
    pub fn first_problem(&self) -> Option<&TestProblem> {
        self.first_problem.as_ref()
    }

    /// True iff nothing failed and nothing errored
    pub fn passed(&self) -> bool {
        self.failures == 0 && self.errors == 0
    }

    /// Aggregate into a failure, `None` if the suite passed
    pub fn to_failure(&self) -> Option<SuiteFailure> {
        if self.passed() {
            return None;
        }
        Some(SuiteFailure {
            suite: self.suite.clone(),
            run: self.run,
            failures: self.failures,
            errors: self.errors,
            first_test: self.first_problem.as_ref().map(|p| p.test.clone()),
            first_cause: self.first_problem.as_ref().map(|p| p.cause.clone()),
        })
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "End test suite {}, run: {}, Failures: {}, Errors: {}",
            self.suite, self.run, self.failures, self.errors
        )
    }
}

/// Cause of a failed suite
///
/// Carries the suite tally plus the first problem; the first problem's cause
/// is exposed as the error source.
#[derive(Debug, Clone, Error)]
#[error("test suite {suite} failed: {failures} failure(s), {errors} error(s) in {run} test(s)")]
pub struct SuiteFailure {
    /// Suite name
    pub suite: String,
    /// Number of tests run
    pub run: u32,
    /// Number of assertion failures
    pub failures: u32,
    /// Number of errors
    pub errors: u32,
    /// Name of the first failing test or hook
    pub first_test: Option<String>,
    /// Cause of the first problem, verbatim
    #[source]
    pub first_cause: Option<Cause>,
}
