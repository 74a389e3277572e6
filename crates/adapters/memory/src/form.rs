//! Form double.

use otp_autofill_core::error::{AutofillError, AutofillResult};
use otp_autofill_core::traits::FormSink;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug)]
struct FormInner {
    has_input: bool,
    value: String,
    change_notifications: u32,
    submissions: u32,
}

impl Default for FormInner {
    fn default() -> Self {
        Self {
            has_input: true,
            value: String::new(),
            change_notifications: 0,
            submissions: 0,
        }
    }
}

/// In-memory OTP input and form.
#[derive(Debug, Clone, Default)]
pub struct MemoryFormSink {
    inner: Arc<Mutex<FormInner>>,
}

impl MemoryFormSink {
    /// Creates a form with an empty OTP input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a page without an OTP input.
    pub fn missing_input() -> Self {
        let form = Self::new();
        form.remove_input();
        form
    }

    /// Removes the OTP input from the page.
    pub fn remove_input(&self) {
        self.inner.lock().has_input = false;
    }

    /// Returns the current input value.
    pub fn value(&self) -> String {
        self.inner.lock().value.clone()
    }

    /// Returns the number of change notifications dispatched.
    pub fn change_notifications(&self) -> u32 {
        self.inner.lock().change_notifications
    }

    /// Returns the number of submissions.
    pub fn submissions(&self) -> u32 {
        self.inner.lock().submissions
    }
}

impl FormSink for MemoryFormSink {
    fn has_input(&self) -> bool {
        self.inner.lock().has_input
    }

    fn set_value(&self, value: &str) -> AutofillResult<()> {
        let mut inner = self.inner.lock();
        if !inner.has_input {
            return Err(AutofillError::NoInputTarget);
        }
        inner.value = value.to_string();
        Ok(())
    }

    fn dispatch_change_notification(&self) -> AutofillResult<()> {
        let mut inner = self.inner.lock();
        if !inner.has_input {
            return Err(AutofillError::NoInputTarget);
        }
        inner.change_notifications += 1;
        Ok(())
    }

    fn submit(&self) -> AutofillResult<()> {
        self.inner.lock().submissions += 1;
        Ok(())
    }
}
