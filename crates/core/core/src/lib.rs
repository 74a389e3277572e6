//! # OTP Autofill Core
//!
//! Core types and traits shared by the OTP autofill crates:
//! - The data model (candidate codes, the accepted code, coordinator state)
//! - The error taxonomy
//! - Collaborator traits for the credential source, clipboard, form and cache
//! - Abort signals for cancellable acquisition calls
//! - Coordinator configuration

pub mod config;
pub mod error;
pub mod signal;
pub mod traits;
pub mod types;

pub use config::CoordinatorConfig;
pub use error::{AutofillError, AutofillResult};
pub use signal::{AbortController, AbortSignal};
pub use traits::{ClipboardSource, CodeCache, Collaborators, CredentialSource, FormSink, LogNoticeSink, NoticeSink};
pub use types::{
    AcceptedCode, CandidateCode, ChannelKind, CoordinatorState, NoticeKind, Transport, UserNotice, Visibility,
};
