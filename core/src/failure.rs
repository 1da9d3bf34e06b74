//! Soft assertions with a scoped failure handler.
//!
//! [`check`] (and the [`check!`](crate::check!) macro) never stops execution
//! by itself. A failed check is handed to the innermost installed
//! [`FailureHandler`]; the default one prints `'<op>' failed` to the current
//! output target and carries on. Install [`PanicOnFailure`] or
//! [`AbortOnFailure`] to make failures fatal.

use std::cell::RefCell;
use std::process;
use std::rc::Rc;
use std::thread::LocalKey;

use coretools_types::FailureMode;
use tracing::{debug, error, warn};

use crate::output::current_target;
use crate::outln;
use crate::scope::{ScopeGuard, ScopeStack, Scoped};

/// Reacts to a failed check. `op` is the label of the check.
pub trait FailureHandler {
    fn on_failure(&self, op: &str);
}

impl<F> FailureHandler for F
where
    F: Fn(&str),
{
    fn on_failure(&self, op: &str) {
        self(op);
    }
}

/// Default handler: report and continue.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFailure;

impl FailureHandler for LogFailure {
    fn on_failure(&self, op: &str) {
        warn!(op, "Check failed");
        if let Err(e) = outln!("'{op}' failed") {
            warn!(op, "Failed to report check failure: {e}");
        }
    }
}

/// Panics on failure. Unwinding still restores every scope.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanicOnFailure;

impl FailureHandler for PanicOnFailure {
    fn on_failure(&self, op: &str) {
        panic!("check '{op}' failed");
    }
}

/// Reports and aborts the process.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbortOnFailure;

impl FailureHandler for AbortOnFailure {
    fn on_failure(&self, op: &str) {
        error!(op, "Check failed, aborting");
        if let Err(e) = outln!("'{op}' failed") {
            warn!(op, "Failed to report check failure: {e}");
        }
        if let Err(e) = current_target().flush() {
            warn!(op, "Failed to flush output before abort: {e}");
        }
        process::abort();
    }
}

/// The bundled handler for a configured [`FailureMode`].
#[must_use]
pub fn handler_for(mode: FailureMode) -> Rc<dyn FailureHandler> {
    match mode {
        FailureMode::Log => Rc::new(LogFailure),
        FailureMode::Panic => Rc::new(PanicOnFailure),
        FailureMode::Abort => Rc::new(AbortOnFailure),
    }
}

impl Scoped for Rc<dyn FailureHandler> {
    const NAME: &'static str = "failure_handler";

    fn initial() -> Self {
        Rc::new(LogFailure)
    }

    fn slot() -> &'static LocalKey<RefCell<Vec<Self>>> {
        thread_local! {
            static HANDLERS: RefCell<Vec<Rc<dyn FailureHandler>>> = const { RefCell::new(Vec::new()) };
        }
        &HANDLERS
    }
}

/// Keeps a failure handler installed until dropped.
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use coretools_core::{FailureScope, check};
///
/// let failures = Rc::new(Cell::new(0));
/// {
///     let seen = Rc::clone(&failures);
///     let _scope = FailureScope::from_fn(move |_op| seen.set(seen.get() + 1));
///     check!(1 + 1 == 3);
/// }
/// assert_eq!(failures.get(), 1);
/// ```
///
/// ```compile_fail
/// fn assert_send<T: Send>() {}
/// assert_send::<coretools_core::FailureScope>();
/// ```
#[derive(Debug)]
#[must_use = "the previous handler is restored as soon as the scope is dropped"]
pub struct FailureScope {
    _guard: ScopeGuard<Rc<dyn FailureHandler>>,
}

impl FailureScope {
    pub fn install(handler: impl FailureHandler + 'static) -> Self {
        Self::install_shared(Rc::new(handler))
    }

    pub fn install_shared(handler: Rc<dyn FailureHandler>) -> Self {
        Self {
            _guard: ScopeStack::push(handler),
        }
    }

    /// Install a closure. Unlike [`FailureScope::install`], the closure's
    /// argument type is inferred.
    pub fn from_fn(handler: impl Fn(&str) + 'static) -> Self {
        Self::install(handler)
    }

    pub fn for_mode(mode: FailureMode) -> Self {
        Self::install_shared(handler_for(mode))
    }
}

/// Hand `op` to the active failure handler unless `condition` holds.
///
/// Returns `condition`, so callers can branch on the outcome.
pub fn check(condition: bool, op: &str) -> bool {
    if !condition {
        debug!(op, "Dispatching failed check");
        // Cloned out so the handler may install scopes of its own.
        let handler = ScopeStack::<Rc<dyn FailureHandler>>::top();
        handler.on_failure(op);
    }
    condition
}

/// Check a condition, labelling it with its own source text.
///
/// `check!(a == b)` reports `'a == b' failed`; `check!(cond, "label")` uses an
/// explicit label. Evaluates to the condition.
#[macro_export]
macro_rules! check {
    ($cond:expr $(,)?) => {
        $crate::check($cond, ::std::stringify!($cond))
    };
    ($cond:expr, $label:expr $(,)?) => {
        $crate::check($cond, $label)
    };
}
