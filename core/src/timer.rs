//! Scoped wall-clock timing.

use std::fmt;
use std::time::{Duration, Instant};

use coretools_types::{HumanDuration, ReportMode};
use tracing::{info, warn};

use crate::outln;

/// Receives the elapsed time of a finished [`ScopedTimer`].
pub trait TimeReporter {
    fn report(&self, elapsed: Duration, op: &str);
}

impl<F> TimeReporter for F
where
    F: Fn(Duration, &str),
{
    fn report(&self, elapsed: Duration, op: &str) {
        self(elapsed, op);
    }
}

/// Default reporter: `Operation '<op>' took <duration>` on the current output
/// target.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintReport;

impl TimeReporter for PrintReport {
    fn report(&self, elapsed: Duration, op: &str) {
        if let Err(e) = outln!("Operation '{op}' took {}", HumanDuration(elapsed)) {
            warn!(operation = op, "Failed to report timing: {e}");
        }
    }
}

/// Emits an `info` event with the operation and elapsed time as fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceReport;

impl TimeReporter for TraceReport {
    fn report(&self, elapsed: Duration, op: &str) {
        info!(
            operation = op,
            elapsed_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
            elapsed = %HumanDuration(elapsed),
            "operation completed"
        );
    }
}

/// The bundled reporter for a configured [`ReportMode`].
#[must_use]
pub fn reporter_for(mode: ReportMode) -> Box<dyn TimeReporter> {
    match mode {
        ReportMode::Print => Box::new(PrintReport),
        ReportMode::Trace => Box::new(TraceReport),
    }
}

/// Reports how long it lived.
///
/// Timing starts at construction; the report is sent on drop, or earlier via
/// [`ScopedTimer::finish`].
///
/// Assigning a new timer over a live one (`timer = ScopedTimer::new("b")`)
/// reports the old timer exactly once, but the new timer is built first, so
/// its start precedes that report. Use [`ScopedTimer::restart`] when the old
/// report must land before the new measurement begins.
#[must_use = "a timer reports immediately when dropped"]
pub struct ScopedTimer {
    operation: String,
    reporter: Box<dyn TimeReporter>,
    start: Instant,
    armed: bool,
}

impl ScopedTimer {
    pub fn new(operation: impl Into<String>) -> Self {
        Self::with_reporter(operation, PrintReport)
    }

    pub fn with_reporter(operation: impl Into<String>, reporter: impl TimeReporter + 'static) -> Self {
        Self::with_boxed(operation, Box::new(reporter))
    }

    pub fn with_mode(operation: impl Into<String>, mode: ReportMode) -> Self {
        Self::with_boxed(operation, reporter_for(mode))
    }

    fn with_boxed(operation: impl Into<String>, reporter: Box<dyn TimeReporter>) -> Self {
        Self {
            operation: operation.into(),
            reporter,
            start: Instant::now(),
            armed: true,
        }
    }

    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Report the current operation, then start timing `operation` from now.
    pub fn restart(&mut self, operation: impl Into<String>) {
        self.report_now();
        self.operation = operation.into();
        self.armed = true;
        self.start = Instant::now();
    }

    /// Report now and return the elapsed time. Dropping afterwards is silent.
    pub fn finish(mut self) -> Duration {
        self.report_now()
    }

    fn report_now(&mut self) -> Duration {
        let elapsed = self.start.elapsed();
        if self.armed {
            self.armed = false;
            self.reporter.report(elapsed, &self.operation);
        }
        elapsed
    }
}

impl fmt::Debug for ScopedTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedTimer")
            .field("operation", &self.operation)
            .field("start", &self.start)
            .field("armed", &self.armed)
            .finish_non_exhaustive()
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        self.report_now();
    }
}
