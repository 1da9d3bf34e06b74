//! Behaviour selectors resolved from configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What a failed check does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureMode {
    /// Report `'<op>' failed` and continue.
    #[default]
    Log,
    /// Panic, unwinding through the caller.
    Panic,
    /// Report, then abort the process.
    Abort,
}

/// Where a scoped timer's report goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    /// `Operation '<op>' took <duration>` on the current output target.
    #[default]
    Print,
    /// A structured `tracing` event.
    Trace,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct UnknownModeError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl FailureMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Panic => "panic",
            Self::Abort => "abort",
        }
    }

    #[must_use]
    pub fn is_fatal(self) -> bool {
        !matches!(self, Self::Log)
    }
}

impl FromStr for FailureMode {
    type Err = UnknownModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "log" => Ok(Self::Log),
            "panic" => Ok(Self::Panic),
            "abort" => Ok(Self::Abort),
            _ => Err(UnknownModeError {
                kind: "failure mode",
                value: s.to_string(),
                expected: "log, panic, abort",
            }),
        }
    }
}

impl fmt::Display for FailureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ReportMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Print => "print",
            Self::Trace => "trace",
        }
    }
}

impl FromStr for ReportMode {
    type Err = UnknownModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "print" => Ok(Self::Print),
            "trace" => Ok(Self::Trace),
            _ => Err(UnknownModeError {
                kind: "report mode",
                value: s.to_string(),
                expected: "print, trace",
            }),
        }
    }
}

impl fmt::Display for ReportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
