//! Shared test utilities and fixtures
//!
//! In-memory output targets for observing what the redirect stack writes.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::io::{self, Write};
use std::rc::Rc;

use coretools_core::OutputHandle;

/// An in-memory output target that remembers when it was released.
#[derive(Clone, Default)]
pub struct Capture {
    buf: Rc<RefCell<String>>,
    released: Rc<Cell<bool>>,
}

impl Capture {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh handle writing into this capture.
    pub fn handle(&self) -> OutputHandle {
        OutputHandle::from_writer(CaptureWriter(self.clone()))
    }

    pub fn text(&self) -> String {
        self.buf.borrow().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.buf.borrow().lines().map(str::to_string).collect()
    }

    pub fn released(&self) -> bool {
        self.released.get()
    }
}

struct CaptureWriter(Capture);

impl Write for CaptureWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.0.buf.borrow_mut().push_str(&String::from_utf8_lossy(bytes));
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for CaptureWriter {
    fn drop(&mut self) {
        self.0.released.set(true);
    }
}
