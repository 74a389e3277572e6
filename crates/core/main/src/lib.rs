//! # OTP Autofill
//!
//! Fills a one-time-passcode field from whichever acquisition channel
//! produces a valid code first, exactly once per page lifetime.
//!
//! Two channels race:
//! - the push channel waits on a [`CredentialSource`] (SMS-delivered codes),
//! - the poll channel reads a [`ClipboardSource`] every two seconds while
//!   the page is visible.
//!
//! Both feed a single arbiter that validates candidates, accepts the first
//! valid one, writes it to the [`FormSink`], caches it and submits the form.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use otp_autofill::prelude::*;
//! use otp_autofill_adapter_memory::MemoryPage;
//!
//! #[tokio::main]
//! async fn main() -> AutofillResult<()> {
//!     let page = MemoryPage::new();
//!     let coordinator = Coordinator::new(page.collaborators(), CoordinatorConfig::default())?;
//!
//!     coordinator.start().await;
//!     page.credentials.deliver("482913");
//!
//!     let accepted = coordinator.wait_for_acceptance().await;
//!     assert_eq!(accepted.value, "482913");
//!
//!     coordinator.stop().await;
//!     Ok(())
//! }
//! ```

mod arbiter;
mod context;
mod coordinator;
mod poll;
mod push;

pub use arbiter::Arbitration;
pub use coordinator::Coordinator;

// Re-export core types
pub use otp_autofill_core::*;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{Arbitration, Coordinator};
    pub use otp_autofill_core::config::CoordinatorConfig;
    pub use otp_autofill_core::error::{AutofillError, AutofillResult};
    pub use otp_autofill_core::traits::{
        ClipboardSource, CodeCache, Collaborators, CredentialSource, FormSink, NoticeSink,
    };
    pub use otp_autofill_core::types::{
        AcceptedCode, CandidateCode, ChannelKind, CoordinatorState, Transport, UserNotice, Visibility,
    };
    pub use otp_autofill_events::{autofill_events, EventBus};
}
