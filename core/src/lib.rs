//! Scoped developer utilities for coretools.
//!
//! Everything here is built on one mechanism: a per-thread stack of
//! "current values" that a guard object overrides for the rest of a scope.
//!
//! - **`output`**: where [`out!`] / [`outln!`] write; redirected with [`Redirect`]
//! - **`failure`**: what a failed [`check!`] does; overridden with [`FailureScope`]
//! - **`timer`**: [`ScopedTimer`], which reports its lifetime when dropped
//!
//! The stacks are thread-local. A redirect or handler installed on one thread
//! is invisible to every other thread, and guards cannot be sent across
//! threads.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod failure;
mod output;
mod scope;
mod timer;

pub use coretools_types::{ErrorAnd, ErrorCode, FailureMode, HumanDuration, ReportMode};
pub use failure::{
    AbortOnFailure, FailureHandler, FailureScope, LogFailure, PanicOnFailure, check, handler_for,
};
pub use output::{
    OutputHandle, Redirect, SharedHandle, current_target, print, println, redirect_depth,
    references,
};
pub use scope::{ScopeGuard, ScopeStack, Scoped};
pub use timer::{PrintReport, ScopedTimer, TimeReporter, TraceReport, reporter_for};
