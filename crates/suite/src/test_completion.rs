//! Test suite completion
//!
//! A [`TestCompletion`] is a `Completion<()>` whose success means "every test
//! in the suite passed" and whose failure means "at least one test failed or
//! the suite errored". It adds no mechanism of its own: every operation
//! forwards to the wrapped completion.
//!
//! ## Example
//!
//! ```
//! use tally_suite::{SuiteReport, TestCompletion};
//!
//! let completion = TestCompletion::new("the_test_suite");
//! completion.on_complete(|outcome| {
//!     if let Some(cause) = outcome.cause() {
//!         eprintln!("suite failed: {cause}");
//!     }
//! });
//!
//! let mut report = SuiteReport::new("the_test_suite");
//! report.record_pass();
//! completion.finish(&report).unwrap();
//! assert!(completion.succeeded());
//! ```

use crate::report::{SuiteFailure, SuiteReport};
use std::fmt;
use std::time::Duration;
use tally_core::{
    BridgeHandler, Cause, Completion, CompletionHandle, CompletionState, DelegateHandle, Outcome,
    Result,
};
use tracing::{info, warn};

/// Default bound on blocking waits (matches the default suite timeout)
pub const DEFAULT_AWAIT_TIMEOUT: Duration = Duration::from_secs(120);

/// Outcome notifier for a whole test suite
#[derive(Clone)]
pub struct TestCompletion {
    completion: Completion<()>,
    await_timeout: Duration,
}

impl TestCompletion {
    /// Create a pending completion for the named suite
    pub fn new(suite: impl Into<String>) -> Self {
        Self::builder().suite(suite).build()
    }

    /// Create a builder for suite completion configuration
    pub fn builder() -> TestCompletionBuilder {
        TestCompletionBuilder::new()
    }

    /// Suite name
    pub fn suite_name(&self) -> &str {
        self.completion.label()
    }

    /// Default timeout used by [`await_outcome`](Self::await_outcome)
    pub fn await_timeout(&self) -> Duration {
        self.await_timeout
    }

    /// Register a handler for the suite outcome
    ///
    /// Same delivery rules as [`Completion::on_complete`].
    pub fn on_complete<F>(&self, handler: F)
    where
        F: FnOnce(&Outcome<()>) + Send + 'static,
    {
        self.completion.on_complete(handler);
    }

    /// Register a handler that runs only if every test passed
    pub fn on_success<F>(&self, handler: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.completion.on_success(move |_| handler());
    }

    /// Register a handler that runs only if the suite failed
    pub fn on_failure<F>(&self, handler: F)
    where
        F: FnOnce(&Cause) + Send + 'static,
    {
        self.completion.on_failure(handler);
    }

    /// Mark the suite as passed
    pub fn succeed(&self) -> Result<()> {
        self.completion.succeed(())
    }

    /// Mark the suite as failed
    pub fn fail(&self, cause: impl Into<Cause>) -> Result<()> {
        self.completion.fail(cause)
    }

    /// Resolve from a finished report
    ///
    /// Succeeds iff the report has no failures and no errors; otherwise fails
    /// with the report's [`SuiteFailure`]. A report naming another suite is
    /// still applied, with a warning.
    pub fn finish(&self, report: &SuiteReport) -> Result<()> {
        if report.suite() != self.suite_name() {
            warn!(
                suite = %self.suite_name(),
                report_suite = %report.suite(),
                "Finishing suite with a report from another suite"
            );
        }
        info!(
            suite = %self.suite_name(),
            run = report.run(),
            failures = report.failures(),
            errors = report.errors(),
            "Test suite finished"
        );
        match report.to_failure() {
            None => self.succeed(),
            Some(failure) => self.fail(Cause::new(failure)),
        }
    }

    /// Whether the suite has finished
    pub fn is_completed(&self) -> bool {
        self.completion.is_completed()
    }

    /// Whether the suite passed (`false` while running)
    pub fn succeeded(&self) -> bool {
        self.completion.succeeded()
    }

    /// Whether the suite failed (`false` while running)
    pub fn failed(&self) -> bool {
        self.completion.failed()
    }

    /// Failure cause, if the suite failed
    pub fn cause(&self) -> Option<Cause> {
        self.completion.cause()
    }

    /// Aggregated failure details
    ///
    /// `None` unless the suite failed via [`finish`](Self::finish) or with a
    /// [`SuiteFailure`] cause.
    pub fn failure(&self) -> Option<SuiteFailure> {
        self.cause()
            .and_then(|cause| cause.downcast_ref::<SuiteFailure>().cloned())
    }

    /// Forward the suite outcome into another completion
    ///
    /// This lets, e.g., a service's start-up completion be the suite outcome.
    pub fn resolve(&self, target: &Completion<()>) {
        self.completion.resolve(target);
    }

    /// Block until the suite finishes, bounded by the configured timeout
    pub fn await_outcome(&self) -> Result<Outcome<()>> {
        self.completion.await_outcome(self.await_timeout)
    }

    /// Block until the suite finishes, bounded by `timeout`
    pub fn await_outcome_timeout(&self, timeout: Duration) -> Result<Outcome<()>> {
        self.completion.await_outcome(timeout)
    }

    /// Block until the suite finishes; a failed suite is an error
    ///
    /// # Errors
    /// - `CompletionError::TimedOut` after the configured timeout
    /// - `CompletionError::Failed` carrying the suite failure
    pub fn await_success(&self) -> Result<()> {
        self.completion.await_success(self.await_timeout)
    }

    /// The wrapped completion
    pub fn as_completion(&self) -> &Completion<()> {
        &self.completion
    }

    /// Observe-only handle for another runtime
    pub fn handle(&self) -> DelegateHandle {
        DelegateHandle::from_completion(self.completion.clone())
    }
}

impl CompletionHandle for TestCompletion {
    fn label(&self) -> &str {
        self.suite_name()
    }

    fn is_completed(&self) -> bool {
        TestCompletion::is_completed(self)
    }

    fn succeeded(&self) -> bool {
        TestCompletion::succeeded(self)
    }

    fn failed(&self) -> bool {
        TestCompletion::failed(self)
    }

    fn cause(&self) -> Option<Cause> {
        TestCompletion::cause(self)
    }

    fn subscribe(&self, handler: BridgeHandler) {
        self.completion.subscribe(handler);
    }
}

impl fmt::Debug for TestCompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCompletion")
            .field("completion", &self.completion)
            .field("await_timeout", &self.await_timeout)
            .finish()
    }
}

/// Builder for suite completion configuration.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tally_suite::TestCompletion;
///
/// let completion = TestCompletion::builder()
///     .suite("integration")
///     .await_timeout(Duration::from_secs(30))
///     .build();
/// assert_eq!(completion.suite_name(), "integration");
/// ```
pub struct TestCompletionBuilder {
    suite: String,
    await_timeout: Duration,
    state: CompletionState<()>,
}

impl TestCompletionBuilder {
    /// Create a builder with default settings
    pub fn new() -> Self {
        TestCompletionBuilder {
            suite: "default".to_string(),
            await_timeout: DEFAULT_AWAIT_TIMEOUT,
            state: CompletionState::Pending,
        }
    }

    /// Set the suite name
    pub fn suite(mut self, suite: impl Into<String>) -> Self {
        self.suite = suite.into();
        self
    }

    /// Set the bound on blocking waits
    pub fn await_timeout(mut self, timeout: Duration) -> Self {
        self.await_timeout = timeout;
        self
    }

    /// Start from a known state, e.g. one reported by another runtime
    pub fn state(mut self, state: CompletionState<()>) -> Self {
        self.state = state;
        self
    }

    /// Build the completion
    pub fn build(self) -> TestCompletion {
        TestCompletion {
            completion: Completion::builder()
                .label(self.suite)
                .state(self.state)
                .build(),
            await_timeout: self.await_timeout,
        }
    }
}

impl Default for TestCompletionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
