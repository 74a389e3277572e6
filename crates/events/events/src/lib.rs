//! # OTP Autofill Events
//!
//! In-process event system used as the coordinator's observability hook:
//! - Typed events with a namespace and a name
//! - Pub/sub event bus with exact, namespace and wildcard subscriptions
//! - Bounded event history for inspection
//!
//! ## Example
//!
//! ```rust,ignore
//! use otp_autofill_events::{EventBus, FnHandler, autofill_events};
//!
//! let bus = EventBus::new();
//! bus.on(autofill_events::CODE_ACCEPTED, FnHandler::new("audit", |event| {
//!     println!("accepted from {:?}", event.payload_str("source"));
//!     Ok(())
//! })).await;
//! ```

mod bus;
mod error;
mod event;
mod handler;

pub use bus::EventBus;
pub use error::{EventError, EventResult};
pub use event::{Event, EventBuilder, EventType};
pub use handler::{BoxedHandler, EventHandler, FnHandler, HandlerResult, TracingHandler};

/// Event types published by the coordinator.
pub mod autofill_events {
    /// A channel produced a candidate.
    pub const CANDIDATE_OBSERVED: &str = "candidate.observed";
    /// A candidate failed the format check.
    pub const CANDIDATE_REJECTED: &str = "candidate.rejected";
    /// A candidate arrived after the flow settled.
    pub const CANDIDATE_DISCARDED: &str = "candidate.discarded";
    /// A candidate won arbitration.
    pub const CODE_ACCEPTED: &str = "code.accepted";
    /// The coordinator submitted the form.
    pub const FORM_SUBMITTED: &str = "form.submitted";
    /// The form was submitted by another path.
    pub const FORM_SUBMITTED_EXTERNALLY: &str = "form.submitted_externally";
    /// Writing the accepted code to the form failed.
    pub const FORM_WRITE_FAILED: &str = "form.write_failed";
    /// A channel attempt failed.
    pub const CHANNEL_FAILED: &str = "channel.failed";
    /// A channel is not available on this platform.
    pub const CHANNEL_UNAVAILABLE: &str = "channel.unavailable";
    /// The clipboard was overwritten with an empty string.
    pub const CLIPBOARD_CLEARED: &str = "clipboard.cleared";
    /// Clearing the clipboard failed.
    pub const CLIPBOARD_CLEAR_FAILED: &str = "clipboard.clear_failed";
    /// A user-visible notice was shown.
    pub const NOTICE_SHOWN: &str = "notice.shown";
    /// Clipboard polling was suspended.
    pub const POLLING_SUSPENDED: &str = "polling.suspended";
    /// Clipboard polling was resumed.
    pub const POLLING_RESUMED: &str = "polling.resumed";
    /// The outstanding credential request was cancelled.
    pub const PUSH_CANCELLED: &str = "push.cancelled";
}
