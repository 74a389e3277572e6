//! Core traits for OTP autofill.
//!
//! This module defines the collaborator interfaces the coordinator consumes.
//! The host page (or a test) implements them; the coordinator never reaches
//! the platform directly.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::AutofillResult;
use crate::signal::AbortSignal;
use crate::types::{Transport, UserNotice};

/// Push-based credential retrieval (WebOTP-like).
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Returns true if the platform offers credential retrieval at all.
    fn is_supported(&self) -> bool {
        true
    }

    /// Waits for a code delivered over one of `transports`.
    ///
    /// Implementations should fail with `AutofillError::Aborted` once the
    /// signal fires.
    async fn get(&self, transports: &[Transport], signal: AbortSignal) -> AutofillResult<String>;
}

/// Clipboard text access.
#[async_trait]
pub trait ClipboardSource: Send + Sync {
    /// Returns true if reads are possible on this platform.
    fn is_readable(&self) -> bool {
        true
    }

    /// Returns true if writes are possible on this platform.
    fn is_writable(&self) -> bool {
        true
    }

    /// Reads the current clipboard text.
    async fn read(&self) -> AutofillResult<String>;

    /// Replaces the clipboard text.
    async fn write(&self, text: &str) -> AutofillResult<()>;
}

/// The OTP input field and its enclosing form.
pub trait FormSink: Send + Sync {
    /// Returns true if the page has an OTP input.
    fn has_input(&self) -> bool;

    /// Sets the input value.
    fn set_value(&self, value: &str) -> AutofillResult<()>;

    /// Notifies listeners that the input value changed.
    fn dispatch_change_notification(&self) -> AutofillResult<()>;

    /// Submits the enclosing form.
    fn submit(&self) -> AutofillResult<()>;
}

/// Session-scoped key-value storage.
pub trait CodeCache: Send + Sync {
    /// Gets a value by key.
    fn get(&self, key: &str) -> Option<String>;

    /// Sets a value.
    fn set(&self, key: &str, value: &str);
}

/// Renders recoverable notices to the end user.
pub trait NoticeSink: Send + Sync {
    /// Shows a notice.
    fn show(&self, notice: &UserNotice);
}

/// A notice sink that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNoticeSink;

impl NoticeSink for LogNoticeSink {
    fn show(&self, notice: &UserNotice) {
        tracing::warn!(kind = ?notice.kind, "{}", notice.message);
    }
}

/// The collaborators a coordinator owns.
#[derive(Clone)]
pub struct Collaborators {
    /// Push channel provider.
    pub credentials: Arc<dyn CredentialSource>,
    /// Poll channel provider.
    pub clipboard: Arc<dyn ClipboardSource>,
    /// The form receiving the accepted code.
    pub form: Arc<dyn FormSink>,
    /// Session cache for the accepted code.
    pub cache: Arc<dyn CodeCache>,
    /// User notice renderer.
    pub notices: Arc<dyn NoticeSink>,
}

impl Collaborators {
    /// Bundles the collaborators, with notices going to the log.
    pub fn new(
        credentials: Arc<dyn CredentialSource>,
        clipboard: Arc<dyn ClipboardSource>,
        form: Arc<dyn FormSink>,
        cache: Arc<dyn CodeCache>,
    ) -> Self {
        Self {
            credentials,
            clipboard,
            form,
            cache,
            notices: Arc::new(LogNoticeSink),
        }
    }

    /// Replaces the notice sink.
    pub fn with_notices(mut self, notices: Arc<dyn NoticeSink>) -> Self {
        self.notices = notices;
        self
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("credentials_supported", &self.credentials.is_supported())
            .field("clipboard_readable", &self.clipboard.is_readable())
            .field("clipboard_writable", &self.clipboard.is_writable())
            .field("form_has_input", &self.form.has_input())
            .finish()
    }
}
