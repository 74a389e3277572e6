//! Clipboard double with scripted reads and failure injection.

use async_trait::async_trait;
use otp_autofill_core::error::{AutofillError, AutofillResult};
use otp_autofill_core::traits::ClipboardSource;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Debug)]
struct ClipboardInner {
    text: String,
    scripted: VecDeque<AutofillResult<String>>,
    read_failure: Option<AutofillError>,
    write_failure: Option<AutofillError>,
    readable: bool,
    writable: bool,
    reads: usize,
    writes: Vec<String>,
}

impl Default for ClipboardInner {
    fn default() -> Self {
        Self {
            text: String::new(),
            scripted: VecDeque::new(),
            read_failure: None,
            write_failure: None,
            readable: true,
            writable: true,
            reads: 0,
            writes: Vec::new(),
        }
    }
}

/// In-memory clipboard.
///
/// Reads first consume the scripted queue; once it is empty they return the
/// current text. A persistent read failure overrides both.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    inner: Arc<Mutex<ClipboardInner>>,
}

impl MemoryClipboard {
    /// Creates an empty, readable and writable clipboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clipboard holding `text`.
    pub fn with_text(text: impl Into<String>) -> Self {
        let clipboard = Self::new();
        clipboard.set_text(text);
        clipboard
    }

    /// Marks reads as unsupported on this platform.
    pub fn unreadable(self) -> Self {
        self.inner.lock().readable = false;
        self
    }

    /// Marks writes as unsupported on this platform.
    pub fn unwritable(self) -> Self {
        self.inner.lock().writable = false;
        self
    }

    /// Replaces the current text, as a user copy would.
    pub fn set_text(&self, text: impl Into<String>) {
        self.inner.lock().text = text.into();
    }

    /// Queues the text returned by a future read.
    pub fn push_read(&self, text: impl Into<String>) {
        self.inner.lock().scripted.push_back(Ok(text.into()));
    }

    /// Queues a failure for a future read.
    pub fn push_read_error(&self, error: AutofillError) {
        self.inner.lock().scripted.push_back(Err(error));
    }

    /// Makes every read fail with `error` until cleared.
    pub fn fail_reads_with(&self, error: AutofillError) {
        self.inner.lock().read_failure = Some(error);
    }

    /// Makes every write fail with `error` until cleared.
    pub fn fail_writes_with(&self, error: AutofillError) {
        self.inner.lock().write_failure = Some(error);
    }

    /// Removes injected read and write failures.
    pub fn clear_failures(&self) {
        let mut inner = self.inner.lock();
        inner.read_failure = None;
        inner.write_failure = None;
    }

    /// Returns the current text.
    pub fn text(&self) -> String {
        self.inner.lock().text.clone()
    }

    /// Returns the number of read attempts, failed ones included.
    pub fn read_count(&self) -> usize {
        self.inner.lock().reads
    }

    /// Returns every successfully written text, oldest first.
    pub fn writes(&self) -> Vec<String> {
        self.inner.lock().writes.clone()
    }
}

#[async_trait]
impl ClipboardSource for MemoryClipboard {
    fn is_readable(&self) -> bool {
        self.inner.lock().readable
    }

    fn is_writable(&self) -> bool {
        self.inner.lock().writable
    }

    async fn read(&self) -> AutofillResult<String> {
        let mut inner = self.inner.lock();
        inner.reads += 1;

        if !inner.readable {
            return Err(AutofillError::unsupported("clipboard.readText"));
        }
        if let Some(ref error) = inner.read_failure {
            return Err(error.clone());
        }

        match inner.scripted.pop_front() {
            Some(Ok(text)) => {
                inner.text = text.clone();
                Ok(text)
            }
            Some(Err(error)) => Err(error),
            None => Ok(inner.text.clone()),
        }
    }

    async fn write(&self, text: &str) -> AutofillResult<()> {
        let mut inner = self.inner.lock();

        if !inner.writable {
            return Err(AutofillError::unsupported("clipboard.writeText"));
        }
        if let Some(ref error) = inner.write_failure {
            return Err(error.clone());
        }

        inner.text = text.to_string();
        inner.writes.push(text.to_string());
        Ok(())
    }
}
