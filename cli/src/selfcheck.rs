//! Exercise the library end to end: a redirected print, a timed block of
//! duration-format checks, and a summary on the restored output target.

use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use coretools_config::CoretoolsConfig;
use coretools_core::{
    FailureHandler, FailureMode, FailureScope, Redirect, ScopedTimer, check, handler_for, outln,
};
use coretools_types::format_duration;

pub const DEFAULT_REDIRECT: &str = "coretools-selfcheck.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub failed: usize,
}

pub fn run(config: &CoretoolsConfig, redirect: Option<&Path>) -> Result<Summary> {
    let path = redirect.unwrap_or(Path::new(DEFAULT_REDIRECT));
    print_to_file(path)?;

    let summary = {
        let _timer = ScopedTimer::with_mode("duration checks", config.report_mode());
        check_durations(config.failure_mode())
    };

    if summary.failed == 0 {
        outln!("All {} checks passed.", summary.total)?;
    } else {
        outln!("{} of {} checks failed.", summary.failed, summary.total)?;
    }
    Ok(summary)
}

fn print_to_file(path: &Path) -> Result<()> {
    let _redirect = Redirect::to_path(path)
        .into_result()
        .with_context(|| format!("cannot redirect output to {}", path.display()))?;
    outln!("Hurray!!").with_context(|| format!("cannot write to {}", path.display()))?;
    tracing::info!(path = %path.display(), "Wrote redirected greeting");
    Ok(())
}

fn check_durations(mode: FailureMode) -> Summary {
    let failed = Rc::new(Cell::new(0));
    let results = {
        let counter = Rc::clone(&failed);
        let delegate = handler_for(mode);
        let _scope = FailureScope::from_fn(move |op| {
            counter.set(counter.get() + 1);
            delegate.on_failure(op);
        });

        let ms = Duration::from_millis;
        let ns = Duration::from_nanos;
        let secs = Duration::from_secs;
        [
            check!(format_duration(secs(1)) == "1 s "),
            check!(format_duration(secs(1) + ms(1)) == "1 s 1 ms "),
            check!(format_duration(secs(14) + ms(3) + ns(5)) == "14 s 3 ms 5 ns"),
            check!(format_duration(secs(2 * 3600) + ms(3) + ns(6)) == "2 hr(s) 3 ms 6 ns"),
            check!(format_duration(Duration::ZERO).is_empty()),
        ]
    };

    Summary {
        total: results.len(),
        failed: failed.get(),
    }
}
