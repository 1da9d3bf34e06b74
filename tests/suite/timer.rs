//! Scoped timer tests

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use coretools_core::{Redirect, ReportMode, ScopedTimer};
use coretools_types::format_duration;

use crate::common::Capture;

#[test]
fn default_report_format() {
    let log = Capture::new();
    let _redirect = Redirect::to_handle(log.handle());

    let timer = ScopedTimer::new("index rebuild");
    std::thread::sleep(Duration::from_millis(1));
    let elapsed = timer.finish();

    assert_eq!(
        log.lines(),
        [format!("Operation 'index rebuild' took {}", format_duration(elapsed))]
    );
}

#[test]
fn trace_mode_prints_nothing() {
    let log = Capture::new();
    let _redirect = Redirect::to_handle(log.handle());

    drop(ScopedTimer::with_mode("quiet", ReportMode::Trace));
    assert!(log.text().is_empty());
}

#[test]
fn report_lands_on_target_active_at_drop() {
    let first = Capture::new();
    let second = Capture::new();

    let outer = Redirect::to_handle(first.handle());
    let timer = ScopedTimer::new("spanning");
    drop(outer);
    let _inner = Redirect::to_handle(second.handle());
    drop(timer);

    assert!(first.text().is_empty());
    assert_eq!(second.lines().len(), 1);
}

#[test]
fn replacing_timer_reports_previous_once() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let reporter = |seen: &Rc<RefCell<Vec<String>>>| {
        let seen = Rc::clone(seen);
        move |_: Duration, op: &str| seen.borrow_mut().push(op.to_string())
    };

    let mut timer = ScopedTimer::with_reporter("a", reporter(&seen));
    timer.restart("b");
    assert_eq!(*seen.borrow(), ["a"]);

    timer = ScopedTimer::with_reporter("c", reporter(&seen));
    assert_eq!(*seen.borrow(), ["a", "b"]);

    drop(timer);
    assert_eq!(*seen.borrow(), ["a", "b", "c"]);
}
