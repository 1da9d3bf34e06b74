//! Core value types for coretools.
//!
//! This crate contains pure types with no IO and no global state. Everything
//! here can be used from any layer of the workspace.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod duration;
mod error_and;
mod error_code;
mod modes;

pub use duration::{DurationParts, HumanDuration, format_duration};
pub use error_and::ErrorAnd;
pub use error_code::ErrorCode;
pub use modes::{FailureMode, ReportMode, UnknownModeError};
