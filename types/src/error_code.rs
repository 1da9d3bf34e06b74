//! Platform error codes.

use std::fmt;
use std::io;

/// A platform error number (`errno` on Unix, `GetLastError` on Windows).
///
/// `0` means success. Errors that do not originate from the OS (for example a
/// synthetic `io::Error`) map to [`ErrorCode::UNKNOWN`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ErrorCode(i32);

impl ErrorCode {
    pub const SUCCESS: ErrorCode = ErrorCode(0);
    pub const UNKNOWN: ErrorCode = ErrorCode(-1);

    #[must_use]
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// The error code of the most recent failed OS call on this thread.
    #[must_use]
    pub fn last_os_error() -> Self {
        Self::from(&io::Error::last_os_error())
    }

    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }

    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_failure(self) -> bool {
        !self.is_success()
    }

    /// Rebuild an `io::Error` for this code.
    ///
    /// Returns `None` for [`ErrorCode::SUCCESS`].
    #[must_use]
    pub fn to_io_error(self) -> Option<io::Error> {
        match self.0 {
            0 => None,
            -1 => Some(io::Error::other("unknown error")),
            raw => Some(io::Error::from_raw_os_error(raw)),
        }
    }
}

impl From<&io::Error> for ErrorCode {
    fn from(err: &io::Error) -> Self {
        err.raw_os_error().map_or(Self::UNKNOWN, Self)
    }
}

impl From<io::Error> for ErrorCode {
    fn from(err: io::Error) -> Self {
        Self::from(&err)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_io_error() {
            None => f.write_str("success"),
            Some(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ErrorCode {}
