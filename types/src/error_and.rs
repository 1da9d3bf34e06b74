//! A value paired with the error code of the operation that produced it.

use std::ops::{Deref, DerefMut};

use crate::ErrorCode;

/// An error code together with a value, for operations that report failure
/// without giving up their result.
///
/// Nothing here is validated: a failed code and a populated value may coexist.
/// The value is only meaningful when [`ErrorAnd::is_success`] holds, so check
/// the code before trusting it (or use [`ErrorAnd::into_result`]).
///
/// ```
/// use coretools_types::{ErrorAnd, ErrorCode};
///
/// let opened = ErrorAnd::new(ErrorCode::new(2), String::new());
/// assert!(opened.error_code().is_failure());
/// assert!(opened.into_result().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[must_use = "the error code must be checked before the value is used"]
pub struct ErrorAnd<T> {
    error: ErrorCode,
    value: T,
}

impl<T> ErrorAnd<T> {
    pub fn new(error: ErrorCode, value: T) -> Self {
        Self { error, value }
    }

    pub fn success(value: T) -> Self {
        Self::new(ErrorCode::SUCCESS, value)
    }

    #[must_use]
    pub fn error_code(&self) -> &ErrorCode {
        &self.error
    }

    pub fn error_code_mut(&mut self) -> &mut ErrorCode {
        &mut self.error
    }

    #[must_use]
    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }

    /// Move the value out, discarding the error code.
    #[must_use]
    pub fn into_value(self) -> T {
        self.value
    }

    #[must_use]
    pub fn into_parts(self) -> (ErrorCode, T) {
        (self.error, self.value)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_success()
    }

    /// `Ok(value)` on success. On failure the value is dropped.
    pub fn into_result(self) -> Result<T, ErrorCode> {
        if self.error.is_success() {
            Ok(self.value)
        } else {
            Err(self.error)
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ErrorAnd<U> {
        ErrorAnd::new(self.error, f(self.value))
    }
}

impl<T> Deref for ErrorAnd<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for ErrorAnd<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T> From<(ErrorCode, T)> for ErrorAnd<T> {
    fn from((error, value): (ErrorCode, T)) -> Self {
        Self::new(error, value)
    }
}
