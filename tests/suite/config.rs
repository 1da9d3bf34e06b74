//! Config-driven behaviour tests

use coretools_config::CoretoolsConfig;
use coretools_core::{FailureMode, FailureScope, Redirect, ScopedTimer, check};

use crate::common::Capture;

#[test]
fn configured_modes_drive_handlers_and_reporters() {
    let config = CoretoolsConfig::from_toml(
        "[checks]\non_failure = \"log\"\n[timer]\nreport = \"trace\"\n",
        |_| None,
    )
    .expect("parse");
    assert_eq!(config.failure_mode(), FailureMode::Log);

    let log = Capture::new();
    let _redirect = Redirect::to_handle(log.handle());
    {
        let _scope = FailureScope::for_mode(config.failure_mode());
        let _timer = ScopedTimer::with_mode("configured", config.report_mode());
        check(false, "configured check");
    }

    assert_eq!(log.lines(), ["'configured check' failed"]);
}

#[test]
fn config_file_round_trip_through_loader() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[logging]\nfilter = \"debug\"\n").expect("write");

    let config = CoretoolsConfig::load_from(&path).expect("load");
    assert_eq!(config.logging().filter(), "debug");
    assert_eq!(config.failure_mode(), FailureMode::Log);
}
