//! Output redirection tests

use std::fs;
use std::rc::Rc;

use coretools_core::{OutputHandle, Redirect, current_target, outln, redirect_depth, references};

use crate::common::Capture;

#[test]
fn any_nesting_depth_restores_original_target() {
    let original = current_target();

    for depth in 1..=6 {
        let captures: Vec<Capture> = (0..depth).map(|_| Capture::new()).collect();
        let mut guards = Vec::new();
        for (level, capture) in captures.iter().enumerate() {
            guards.push(Redirect::to_handle(capture.handle()));
            outln!("level {level}").expect("print");
        }
        assert_eq!(redirect_depth(), depth + 1);

        while let Some(guard) = guards.pop() {
            drop(guard);
        }

        assert!(Rc::ptr_eq(&original, &current_target()));
        for (level, capture) in captures.iter().enumerate() {
            assert_eq!(capture.lines(), [format!("level {level}")]);
            assert!(capture.released());
        }
    }
}

#[test]
fn inner_scope_shadows_outer_until_it_ends() {
    let outer = Capture::new();
    let inner = Capture::new();

    {
        let _outer = Redirect::to_handle(outer.handle());
        outln!("one").expect("print");
        {
            let _inner = Redirect::to_handle(inner.handle());
            outln!("two").expect("print");
        }
        outln!("three").expect("print");
    }

    assert_eq!(outer.lines(), ["one", "three"]);
    assert_eq!(inner.lines(), ["two"]);
}

#[test]
fn unopenable_path_reports_failure_code() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocked = dir.path().join("not-a-dir");
    fs::write(&blocked, "file, not a directory").expect("write");

    let redirect = Redirect::to_path(blocked.join("out.log"));
    assert!(redirect.error_code().is_failure());
    assert_ne!(redirect.error_code().raw(), 0);
    assert!(outln!("nowhere").is_err());
}

#[test]
fn shared_handle_outlives_its_first_owner() {
    let capture = Capture::new();
    let owner = Rc::new(capture.handle());

    let outer = Redirect::to_shared(Rc::clone(&owner));
    let inner = Redirect::to_shared(Rc::clone(&owner));
    assert_eq!(references(&owner), 2);

    drop(owner);
    drop(inner);
    assert!(!capture.released(), "released while still on the stack");
    outln!("alive").expect("print");

    drop(outer);
    assert!(capture.released());
    assert_eq!(capture.text(), "alive\n");
}

#[test]
fn file_redirect_appends_across_scopes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("log.txt");
    fs::write(&path, "existing\n").expect("seed");

    {
        let redirect = Redirect::to_path(&path);
        assert!(redirect.is_success());
        outln!("appended").expect("print");
    }

    assert_eq!(fs::read_to_string(&path).expect("read"), "existing\nappended\n");
}

#[test]
fn adopted_file_is_written_and_released() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("adopted.txt");
    let file = fs::File::create(&path).expect("create");

    {
        let _redirect = Redirect::to_handle(file);
        outln!("adopted {}", 1).expect("print");
    }

    assert_eq!(fs::read_to_string(&path).expect("read"), "adopted 1\n");
}

#[test]
fn stderr_handle_is_never_the_default() {
    assert!(current_target().is_stdout());
    let _redirect = Redirect::to_handle(OutputHandle::stderr());
    assert!(current_target().is_stderr());
}

#[test]
fn outer_redirect_dropped_first_still_restores_stdout() {
    let before = redirect_depth();
    let result = std::panic::catch_unwind(|| {
        let outer = Redirect::to_handle(OutputHandle::stderr());
        let _inner = Redirect::to_handle(OutputHandle::stderr());
        drop(outer);
    });

    assert_eq!(result.is_err(), cfg!(debug_assertions));
    assert_eq!(redirect_depth(), before);
    assert!(current_target().is_stdout());
}
