//! TestCompletion Lifecycle Tests
//!
//! Tests for suite-level resolution:
//! - finishing from a report
//! - failure details
//! - forwarding into other completions

use crate::*;
use std::thread;
use std::time::Duration;

// =============================================================================
// FINISH FROM REPORT
// =============================================================================

#[test]
fn test_all_passing_suite_succeeds() {
    init_tracing();
    let suite = TestCompletion::new("the_test_suite");
    let log = call_log();
    suite.on_complete(record(&log, "observer"));

    let mut report = SuiteReport::new("the_test_suite");
    for _ in 0..3 {
        report.record_pass();
    }
    suite.finish(&report).unwrap();

    assert!(suite.succeeded());
    assert_eq!(calls(&log), vec![("observer".to_string(), true, None)]);
}

#[test]
fn test_failing_suite_reports_first_failure() {
    init_tracing();
    let suite = TestCompletion::new("math");
    let mut report = SuiteReport::new("math");
    report.record_pass();
    report.record_failure("adds", "expected 4, got 5");
    report.record_error("divides", "division by zero");
    suite.finish(&report).unwrap();

    assert!(suite.failed());
    let failure = suite.failure().unwrap();
    assert_eq!(failure.suite, "math");
    assert_eq!(failure.run, 3);
    assert_eq!(failure.failures, 1);
    assert_eq!(failure.errors, 1);
    assert_eq!(failure.first_test.as_deref(), Some("adds"));
    assert_eq!(
        failure.first_cause.as_ref().unwrap().to_string(),
        "expected 4, got 5"
    );
}

#[test]
fn test_hook_error_fails_suite_without_tests() {
    let suite = TestCompletion::new("with_before");
    let mut report = SuiteReport::new("with_before");
    report.record_hook_error("before", "could not bind port");
    suite.finish(&report).unwrap();

    let failure = suite.failure().unwrap();
    assert_eq!(failure.run, 0);
    assert_eq!(failure.first_test.as_deref(), Some("before"));
}

#[test]
fn test_suite_resolved_once() {
    let suite = TestCompletion::new("once");
    suite.succeed().unwrap();

    let err: tally::Error = suite.fail("again").unwrap_err().into();
    assert!(err.is_already_resolved());
    assert!(suite.succeeded());
    assert!(suite.cause().is_none());
}

// =============================================================================
// OBSERVING FROM OTHER THREADS
// =============================================================================

#[test]
fn test_engine_thread_resolves_observer_waits() {
    let suite = TestCompletion::builder()
        .suite("engine")
        .await_timeout(Duration::from_secs(10))
        .build();

    let engine = {
        let suite = suite.clone();
        thread::spawn(move || {
            let mut report = SuiteReport::new("engine");
            report.record_pass();
            report.record_failure("flaky", "timed out waiting for reply");
            suite.finish(&report).unwrap();
        })
    };

    let outcome = suite.await_outcome().unwrap();
    engine.join().unwrap();

    assert!(outcome.is_failed());
    let cause = outcome.cause().unwrap();
    let failure = cause.downcast_ref::<SuiteFailure>().unwrap();
    assert_eq!(failure.failures, 1);
}

#[test]
fn test_suite_outcome_forwarded_to_startup() {
    let suite = TestCompletion::new("verticle");
    let startup = Completion::<()>::labeled("deploy");
    suite.resolve(&startup);
    assert!(!startup.is_completed());

    suite.finish(&SuiteReport::new("verticle")).unwrap();
    assert!(startup.succeeded());
}

#[test]
fn test_default_await_timeout() {
    let suite = TestCompletion::new("defaults");
    assert_eq!(suite.await_timeout(), tally::DEFAULT_AWAIT_TIMEOUT);
    assert_eq!(suite.await_timeout(), Duration::from_secs(120));
}
