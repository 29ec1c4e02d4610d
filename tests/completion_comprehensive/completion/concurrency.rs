//! Completion Concurrency Tests
//!
//! Tests for thread safety:
//! - Registration racing with resolution
//! - Competing resolvers
//! - Handler order under cross-thread registration

use crate::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Barrier;
use std::thread;
use std::time::Duration;

/// Test that no handler is lost or doubled when registration races resolution
#[test]
fn test_registration_races_resolution() {
    init_tracing();
    const NUM_REGISTRARS: usize = 8;
    const HANDLERS_PER_THREAD: usize = 100;
    const ROUNDS: usize = 25;

    for _ in 0..ROUNDS {
        let completion = Completion::<()>::new();
        let invocations = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(NUM_REGISTRARS + 1));

        let handles: Vec<_> = (0..NUM_REGISTRARS)
            .map(|_| {
                let completion = completion.clone();
                let invocations = Arc::clone(&invocations);
                let barrier = Arc::clone(&barrier);

                thread::spawn(move || {
                    barrier.wait();
                    for _ in 0..HANDLERS_PER_THREAD {
                        let invocations = Arc::clone(&invocations);
                        completion.on_complete(move |_: &Outcome<()>| {
                            invocations.fetch_add(1, Ordering::SeqCst);
                        });
                    }
                })
            })
            .collect();

        barrier.wait();
        completion.succeed(()).unwrap();

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(
            invocations.load(Ordering::SeqCst),
            NUM_REGISTRARS * HANDLERS_PER_THREAD
        );
    }
}

/// Test that exactly one of many competing resolvers wins
#[test]
fn test_competing_resolvers_single_winner() {
    const NUM_RESOLVERS: usize = 10;

    let completion = Completion::<usize>::new();
    let invocations = Arc::new(AtomicUsize::new(0));
    let i = Arc::clone(&invocations);
    completion.on_complete(move |_| {
        i.fetch_add(1, Ordering::SeqCst);
    });

    let barrier = Arc::new(Barrier::new(NUM_RESOLVERS));
    let handles: Vec<_> = (0..NUM_RESOLVERS)
        .map(|n| {
            let completion = completion.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let result = if n % 2 == 0 {
                    completion.succeed(n)
                } else {
                    completion.fail(format!("resolver {}", n))
                };
                result.is_ok()
            })
        })
        .collect();

    let winners = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|won| *won)
        .count();

    assert_eq!(winners, 1);
    assert_eq!(invocations.load(Ordering::SeqCst), 1);

    // State and cause agree
    if completion.succeeded() {
        assert!(completion.cause().is_none());
        assert!(completion.value().unwrap() % 2 == 0);
    } else {
        assert!(completion.failed());
        assert!(completion.cause().unwrap().to_string().starts_with("resolver "));
        assert!(completion.value().is_none());
    }
}

/// Test that a single registering thread observes its own handlers in order
#[test]
fn test_per_thread_order_preserved() {
    let completion = Completion::<()>::new();
    let log = call_log();

    let registrar = {
        let completion = completion.clone();
        let log = Arc::clone(&log);
        thread::spawn(move || {
            for i in 0..50 {
                completion.on_complete(record(&log, &i.to_string()));
            }
        })
    };

    thread::sleep(Duration::from_millis(1));
    completion.succeed(()).unwrap();
    registrar.join().unwrap();

    let order: Vec<usize> = calls(&log)
        .into_iter()
        .map(|(name, _, _)| name.parse().unwrap())
        .collect();
    assert_eq!(order, (0..50).collect::<Vec<_>>());
}

/// Test that many blocked waiters all wake on resolution
#[test]
fn test_waiters_wake_on_resolution() {
    const NUM_WAITERS: usize = 6;

    let completion = Completion::<u32>::new();
    let handles: Vec<_> = (0..NUM_WAITERS)
        .map(|_| {
            let completion = completion.clone();
            thread::spawn(move || completion.await_success(Duration::from_secs(10)))
        })
        .collect();

    thread::sleep(Duration::from_millis(5));
    completion.succeed(7).unwrap();

    for h in handles {
        assert_eq!(h.join().unwrap().unwrap(), 7);
    }
}
