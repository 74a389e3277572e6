//! # OTP Autofill Memory Adapter
//!
//! In-memory implementations of every collaborator the coordinator
//! consumes, primarily intended for testing and simulation.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use otp_autofill_adapter_memory::MemoryPage;
//!
//! let page = MemoryPage::new();
//! let coordinator = Coordinator::new(page.collaborators(), CoordinatorConfig::default());
//! coordinator.start().await;
//! page.credentials.deliver("482913");
//! ```

mod cache;
mod clipboard;
mod credentials;
mod form;
mod notices;

pub use cache::MemoryCache;
pub use clipboard::MemoryClipboard;
pub use credentials::ScriptedCredentialSource;
pub use form::MemoryFormSink;
pub use notices::RecordingNoticeSink;

use otp_autofill_core::traits::Collaborators;
use std::sync::Arc;

/// A full set of in-memory collaborators standing in for one page.
#[derive(Debug, Clone, Default)]
pub struct MemoryPage {
    /// Push channel double.
    pub credentials: ScriptedCredentialSource,
    /// Clipboard double.
    pub clipboard: MemoryClipboard,
    /// Form double.
    pub form: MemoryFormSink,
    /// Session storage double.
    pub cache: MemoryCache,
    /// Notice recorder.
    pub notices: RecordingNoticeSink,
}

impl MemoryPage {
    /// Creates a page with a supported credential source, a readable and
    /// writable clipboard and a form with an OTP input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns collaborators sharing state with this page.
    pub fn collaborators(&self) -> Collaborators {
        Collaborators::new(
            Arc::new(self.credentials.clone()),
            Arc::new(self.clipboard.clone()),
            Arc::new(self.form.clone()),
            Arc::new(self.cache.clone()),
        )
        .with_notices(Arc::new(self.notices.clone()))
    }
}
