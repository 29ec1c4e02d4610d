//! Completion Property Tests
//!
//! Randomized operation sequences checked against a simple model:
//! - only the first resolution takes effect
//! - every handler runs exactly once, in registration order
//! - queries are stable once resolved

use crate::*;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Register,
    Succeed(u8),
    Fail(String),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Register),
        1 => any::<u8>().prop_map(Op::Succeed),
        1 => "[a-z]{1,8}".prop_map(Op::Fail),
    ]
}

proptest! {
    #[test]
    fn prop_first_resolution_wins(ops in prop::collection::vec(arb_op(), 0..40)) {
        let completion = Completion::<u8>::new();
        let log = Arc::new(Mutex::new(Vec::<(usize, Option<u8>, Option<String>)>::new()));
        let mut registered = 0usize;
        let mut model: Option<std::result::Result<u8, String>> = None;

        for op in ops {
            match op {
                Op::Register => {
                    let log = Arc::clone(&log);
                    let id = registered;
                    registered += 1;
                    completion.on_complete(move |outcome: &Outcome<u8>| {
                        log.lock().unwrap().push((
                            id,
                            outcome.value().copied(),
                            outcome.cause().map(|c| c.to_string()),
                        ));
                    });
                }
                Op::Succeed(v) => {
                    let result = completion.succeed(v);
                    prop_assert_eq!(result.is_ok(), model.is_none());
                    model.get_or_insert(Ok(v));
                }
                Op::Fail(msg) => {
                    let result = completion.fail(msg.clone());
                    prop_assert_eq!(result.is_ok(), model.is_none());
                    model.get_or_insert(Err(msg));
                }
            }
        }

        let log = log.lock().unwrap().clone();
        match &model {
            None => {
                prop_assert!(log.is_empty());
                prop_assert!(!completion.is_completed());
            }
            Some(expected) => {
                // Everyone ran once, in registration order
                let ids: Vec<usize> = log.iter().map(|e| e.0).collect();
                prop_assert_eq!(ids, (0..registered).collect::<Vec<_>>());

                for (_, value, cause) in &log {
                    match expected {
                        Ok(v) => {
                            prop_assert_eq!(*value, Some(*v));
                            prop_assert!(cause.is_none());
                        }
                        Err(msg) => {
                            prop_assert!(value.is_none());
                            prop_assert_eq!(cause.as_deref(), Some(msg.as_str()));
                        }
                    }
                }

                for _ in 0..2 {
                    prop_assert_eq!(completion.succeeded(), expected.is_ok());
                    prop_assert_eq!(completion.failed(), expected.is_err());
                    prop_assert_eq!(completion.cause().is_some(), expected.is_err());
                }
            }
        }
    }

    #[test]
    fn prop_n_handlers_before_success(n in 0usize..64) {
        let completion = Completion::<()>::new();
        let log = call_log();
        for i in 0..n {
            completion.on_complete(record(&log, &i.to_string()));
        }
        completion.succeed(()).unwrap();

        let calls = calls(&log);
        prop_assert_eq!(calls.len(), n);
        for (i, (name, ok, cause)) in calls.iter().enumerate() {
            prop_assert_eq!(name, &i.to_string());
            prop_assert!(*ok);
            prop_assert!(cause.is_none());
        }
    }

    #[test]
    fn prop_failure_cause_delivered_verbatim(n in 1usize..16, msg in "[a-z ]{1,20}") {
        let completion = Completion::<()>::new();
        let cause = Cause::msg(&msg);
        let seen = Arc::new(Mutex::new(Vec::new()));
        for _ in 0..n {
            let seen = Arc::clone(&seen);
            completion.on_failure(move |c: &Cause| seen.lock().unwrap().push(c.clone()));
        }
        completion.fail(cause.clone()).unwrap();

        let seen = seen.lock().unwrap();
        prop_assert_eq!(seen.len(), n);
        prop_assert!(seen.iter().all(|c| c.ptr_eq(&cause)));
    }
}
