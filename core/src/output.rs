//! Scoped output redirection.
//!
//! Every print goes to the top of the per-thread output stack. A
//! [`Redirect`] pushes a new target for as long as it lives:
//!
//! ```no_run
//! use coretools_core::{Redirect, outln};
//!
//! {
//!     let redirect = Redirect::to_path("build.log");
//!     if redirect.error_code().is_failure() {
//!         eprintln!("cannot open build.log: {}", redirect.error_code());
//!     }
//!     let _ = outln!("goes to build.log");
//! }
//! let _ = outln!("back on stdout");
//! ```
//!
//! Targets on the stack are shared through [`SharedHandle`] (`Rc`), so the
//! underlying file is closed only when the last stack entry and the last
//! outside owner are gone.

use std::cell::RefCell;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
#[cfg(unix)]
use std::os::fd::{AsRawFd, RawFd};
use std::path::Path;
use std::rc::Rc;
use std::thread::LocalKey;

use coretools_types::{ErrorAnd, ErrorCode};
use tracing::{debug, warn};

use crate::scope::{ScopeGuard, ScopeStack, Scoped};

/// An output target shared between the stack and any outside owners.
pub type SharedHandle = Rc<OutputHandle>;

enum HandleKind {
    Stdout,
    Stderr,
    File(File),
    Writer(RefCell<Box<dyn Write>>),
    /// No resource; carries the error that prevented opening one.
    Closed(ErrorCode),
}

/// Owns one output resource.
///
/// Files and adopted writers are flushed and released on drop. The process
/// stdout/stderr streams are never closed.
pub struct OutputHandle {
    kind: HandleKind,
}

impl OutputHandle {
    #[must_use]
    pub fn stdout() -> Self {
        Self {
            kind: HandleKind::Stdout,
        }
    }

    #[must_use]
    pub fn stderr() -> Self {
        Self {
            kind: HandleKind::Stderr,
        }
    }

    /// A handle without a resource. Writes fail with `error`.
    #[must_use]
    pub fn none(error: ErrorCode) -> Self {
        Self {
            kind: HandleKind::Closed(error),
        }
    }

    /// Adopt an arbitrary writer.
    pub fn from_writer(writer: impl Write + 'static) -> Self {
        Self {
            kind: HandleKind::Writer(RefCell::new(Box::new(writer))),
        }
    }

    /// Open `path` for appending, creating it if missing.
    ///
    /// On failure the value is [`OutputHandle::none`] and the error code is
    /// the platform error.
    pub fn open_append(path: impl AsRef<Path>) -> ErrorAnd<Self> {
        let path = path.as_ref();
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                debug!(path = %path.display(), "Opened output file");
                ErrorAnd::success(Self::from(file))
            }
            Err(e) => {
                let code = ErrorCode::from(&e);
                warn!(path = %path.display(), code = code.raw(), "Failed to open output file: {e}");
                ErrorAnd::new(code, Self::none(code))
            }
        }
    }

    #[must_use]
    pub fn is_stdout(&self) -> bool {
        matches!(self.kind, HandleKind::Stdout)
    }

    #[must_use]
    pub fn is_stderr(&self) -> bool {
        matches!(self.kind, HandleKind::Stderr)
    }

    /// True for the resource-less sentinel.
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self.kind, HandleKind::Closed(_))
    }

    /// The OS descriptor behind this handle, if it has one.
    #[cfg(unix)]
    #[must_use]
    pub fn raw_fd(&self) -> Option<RawFd> {
        match &self.kind {
            HandleKind::Stdout => Some(io::stdout().as_raw_fd()),
            HandleKind::Stderr => Some(io::stderr().as_raw_fd()),
            HandleKind::File(file) => Some(file.as_raw_fd()),
            HandleKind::Writer(_) | HandleKind::Closed(_) => None,
        }
    }

    /// Write formatted output. Usable through a shared reference, so it works
    /// on a [`SharedHandle`] and with `write!`.
    pub fn write_fmt(&self, args: fmt::Arguments<'_>) -> io::Result<()> {
        match &self.kind {
            HandleKind::Stdout => io::stdout().lock().write_fmt(args),
            HandleKind::Stderr => io::stderr().lock().write_fmt(args),
            HandleKind::File(file) => {
                let mut file = file;
                file.write_fmt(args)
            }
            HandleKind::Writer(writer) => writer
                .try_borrow_mut()
                .map_err(|_| io::Error::other("output writer is already in use"))?
                .write_fmt(args),
            HandleKind::Closed(code) => Err(closed_error(*code)),
        }
    }

    pub fn flush(&self) -> io::Result<()> {
        match &self.kind {
            HandleKind::Stdout => io::stdout().lock().flush(),
            HandleKind::Stderr => io::stderr().lock().flush(),
            HandleKind::File(file) => {
                let mut file = file;
                file.flush()
            }
            HandleKind::Writer(writer) => writer
                .try_borrow_mut()
                .map_err(|_| io::Error::other("output writer is already in use"))?
                .flush(),
            HandleKind::Closed(_) => Ok(()),
        }
    }

    fn kind_name(&self) -> &'static str {
        match self.kind {
            HandleKind::Stdout => "stdout",
            HandleKind::Stderr => "stderr",
            HandleKind::File(_) => "file",
            HandleKind::Writer(_) => "writer",
            HandleKind::Closed(_) => "none",
        }
    }
}

fn closed_error(code: ErrorCode) -> io::Error {
    code.to_io_error()
        .unwrap_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "output handle is closed"))
}

impl From<File> for OutputHandle {
    fn from(file: File) -> Self {
        Self {
            kind: HandleKind::File(file),
        }
    }
}

impl fmt::Debug for OutputHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            HandleKind::Closed(code) => f.debug_tuple("OutputHandle::None").field(code).finish(),
            _ => write!(f, "OutputHandle::{}", self.kind_name()),
        }
    }
}

impl Drop for OutputHandle {
    fn drop(&mut self) {
        match &self.kind {
            HandleKind::File(_) | HandleKind::Writer(_) => {
                if let Err(e) = self.flush() {
                    debug!(kind = self.kind_name(), "Flush before release failed: {e}");
                }
                debug!(kind = self.kind_name(), "Released output handle");
            }
            HandleKind::Stdout | HandleKind::Stderr | HandleKind::Closed(_) => {}
        }
    }
}

impl Scoped for SharedHandle {
    const NAME: &'static str = "output";

    fn initial() -> Self {
        Rc::new(OutputHandle::stdout())
    }

    fn slot() -> &'static LocalKey<RefCell<Vec<Self>>> {
        thread_local! {
            static OUTPUT: RefCell<Vec<SharedHandle>> = const { RefCell::new(Vec::new()) };
        }
        &OUTPUT
    }
}

/// Redirects this thread's output until dropped.
///
/// A redirect stays on the thread that created it:
///
/// ```compile_fail
/// fn assert_send<T: Send>() {}
/// assert_send::<coretools_core::Redirect>();
/// ```
///
/// and cannot be duplicated:
///
/// ```compile_fail
/// let redirect = coretools_core::Redirect::to_handle(coretools_core::OutputHandle::stderr());
/// let _copy = redirect.clone();
/// ```
#[derive(Debug)]
#[must_use = "output is restored as soon as the redirect is dropped"]
pub struct Redirect {
    _guard: ScopeGuard<SharedHandle>,
}

impl Redirect {
    /// Append to the file at `path` for the lifetime of the redirect.
    ///
    /// The redirect is pushed even when opening fails: prints inside the
    /// scope then return the open error instead of reaching the previous
    /// target. Check the error code.
    pub fn to_path(path: impl AsRef<Path>) -> ErrorAnd<Self> {
        OutputHandle::open_append(path).map(|handle| Self::to_shared(Rc::new(handle)))
    }

    /// Adopt an already-open handle (or `File`).
    pub fn to_handle(handle: impl Into<OutputHandle>) -> Self {
        Self::to_shared(Rc::new(handle.into()))
    }

    /// Push a handle that other owners (or other stack entries) also hold.
    pub fn to_shared(handle: SharedHandle) -> Self {
        Self {
            _guard: ScopeStack::push(handle),
        }
    }
}

/// The target prints currently go to.
#[must_use]
pub fn current_target() -> SharedHandle {
    ScopeStack::<SharedHandle>::top()
}

/// How many live stack entries refer to `handle`.
#[must_use]
pub fn references(handle: &SharedHandle) -> usize {
    ScopeStack::<SharedHandle>::count_where(|entry| Rc::ptr_eq(entry, handle))
}

/// Number of output targets on this thread's stack, including stdout.
#[must_use]
pub fn redirect_depth() -> usize {
    ScopeStack::<SharedHandle>::depth()
}

/// Write to the current target. See [`out!`](crate::out).
pub fn print(args: fmt::Arguments<'_>) -> io::Result<()> {
    current_target().write_fmt(args)
}

/// Write a line to the current target. See [`outln!`](crate::outln).
pub fn println(args: fmt::Arguments<'_>) -> io::Result<()> {
    current_target().write_fmt(format_args!("{args}\n"))
}

/// `print!` for the current output target. Evaluates to `io::Result<()>`.
#[macro_export]
macro_rules! out {
    ($($arg:tt)*) => {
        $crate::print(::std::format_args!($($arg)*))
    };
}

/// `println!` for the current output target. Evaluates to `io::Result<()>`.
#[macro_export]
macro_rules! outln {
    () => {
        $crate::print(::std::format_args!("\n"))
    };
    ($($arg:tt)*) => {
        $crate::println(::std::format_args!($($arg)*))
    };
}
