//! Failure handler tests

use std::cell::RefCell;
use std::rc::Rc;

use coretools_core::{FailureMode, FailureScope, LogFailure, PanicOnFailure, Redirect, check};

use crate::common::Capture;

#[test]
fn installed_handler_runs_once_then_previous_is_back() {
    let log = Capture::new();
    let _redirect = Redirect::to_handle(log.handle());

    let calls = Rc::new(RefCell::new(Vec::new()));
    {
        let sink = Rc::clone(&calls);
        let _scope = FailureScope::from_fn(move |op| sink.borrow_mut().push(op.to_string()));
        assert!(!check!(1 > 2));
    }
    assert_eq!(*calls.borrow(), ["1 > 2"]);
    assert!(log.text().is_empty());

    assert!(!check!(3 > 4));
    assert_eq!(calls.borrow().len(), 1);
    assert_eq!(log.lines(), ["'3 > 4' failed"]);
}

#[test]
fn default_handler_is_non_fatal() {
    let log = Capture::new();
    let _redirect = Redirect::to_handle(log.handle());

    let mut reached = 0;
    for n in 0..3 {
        check(n == 99, "n == 99");
        reached += 1;
    }

    assert_eq!(reached, 3);
    assert_eq!(log.lines().len(), 3);
}

#[test]
fn explicit_log_handler_matches_default() {
    let log = Capture::new();
    let _redirect = Redirect::to_handle(log.handle());
    let _scope = FailureScope::install(LogFailure);

    check(false, "explicit");
    assert_eq!(log.text(), "'explicit' failed\n");
}

#[test]
fn fatal_mode_is_opt_in() {
    assert!(!FailureMode::default().is_fatal());
    let result = std::panic::catch_unwind(|| {
        let _scope = FailureScope::for_mode(FailureMode::Panic);
        check(false, "must panic");
    });
    let payload = result.expect_err("panic mode panics");
    let message = payload
        .downcast_ref::<String>()
        .cloned()
        .unwrap_or_default();
    assert_eq!(message, "check 'must panic' failed");
}

#[test]
fn panic_handler_leaves_outer_redirect_intact() {
    let log = Capture::new();
    let _redirect = Redirect::to_handle(log.handle());

    let result = std::panic::catch_unwind(|| {
        let inner = Capture::new();
        let _inner_redirect = Redirect::to_handle(inner.handle());
        let _fatal = FailureScope::install(PanicOnFailure);
        check(false, "inner");
    });
    assert!(result.is_err());

    check(false, "after unwind");
    assert_eq!(log.lines(), ["'after unwind' failed"]);
}
