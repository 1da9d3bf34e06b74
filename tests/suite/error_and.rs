//! Error-and-value pair tests

use coretools_core::{ErrorAnd, ErrorCode, OutputHandle};

#[test]
fn successful_open_has_usable_value() {
    let dir = tempfile::tempdir().expect("tempdir");
    let opened = OutputHandle::open_append(dir.path().join("ok.log"));

    assert!(opened.is_success());
    assert!(!opened.value().is_none());
    writeln!(opened.value(), "hello").expect("write");
}

#[test]
fn failed_open_pairs_code_with_sentinel() {
    let dir = tempfile::tempdir().expect("tempdir");
    let opened = OutputHandle::open_append(dir.path().join("no").join("such").join("x.log"));

    let (code, handle) = opened.into_parts();
    assert!(code.is_failure());
    assert!(handle.is_none());

    let err = writeln!(handle, "dropped").expect_err("sentinel write fails");
    assert_eq!(ErrorCode::from(&err), code);
}

#[test]
fn deref_gives_member_access() {
    let mut pair = ErrorAnd::success(vec![3, 1, 2]);
    pair.sort_unstable();
    assert_eq!(pair.first(), Some(&1));
    assert_eq!(pair.into_value(), [1, 2, 3]);
}
