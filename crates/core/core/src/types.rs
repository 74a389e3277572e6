//! Core data types for OTP autofill.
//!
//! This module contains the data model shared by the coordinator and its
//! collaborators: candidate and accepted codes, the coordinator state and
//! the user-facing notices.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AutofillError;

/// The acquisition channel a candidate or failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    /// Platform credential push (SMS delivered code).
    Push,
    /// Periodic clipboard read.
    Clipboard,
    /// Code extracted from a cross-window message.
    Message,
    /// Code restored from the session cache.
    Cache,
}

impl ChannelKind {
    /// Returns the lowercase name used in logs and events.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Push => "push",
            ChannelKind::Clipboard => "clipboard",
            ChannelKind::Message => "message",
            ChannelKind::Cache => "cache",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport hint passed to the credential source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Code delivered by SMS.
    Sms,
}

/// Page visibility as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// The page is in the foreground.
    #[default]
    Visible,
    /// The page is in the background.
    Hidden,
}

impl Visibility {
    /// Returns true if the page is visible.
    pub fn is_visible(&self) -> bool {
        matches!(self, Visibility::Visible)
    }
}

/// A code string observed on one of the channels, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateCode {
    /// The raw value as produced by the channel.
    pub value: String,
    /// Channel that produced the value.
    pub source: ChannelKind,
    /// When the channel produced the value.
    pub observed_at: DateTime<Utc>,
}

impl CandidateCode {
    /// Creates a candidate observed now.
    pub fn new(value: impl Into<String>, source: ChannelKind) -> Self {
        Self {
            value: value.into(),
            source,
            observed_at: Utc::now(),
        }
    }

    /// Creates a candidate from the push channel.
    pub fn push(value: impl Into<String>) -> Self {
        Self::new(value, ChannelKind::Push)
    }

    /// Creates a candidate from the clipboard channel.
    pub fn clipboard(value: impl Into<String>) -> Self {
        Self::new(value, ChannelKind::Clipboard)
    }
}

/// The single code that won arbitration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedCode {
    /// The normalized code (4 to 6 digits).
    pub value: String,
    /// Channel the winning candidate came from.
    pub source: ChannelKind,
    /// When the code was accepted.
    pub accepted_at: DateTime<Utc>,
}

impl AcceptedCode {
    /// Creates an accepted code stamped now.
    pub fn new(value: impl Into<String>, source: ChannelKind) -> Self {
        Self {
            value: value.into(),
            source,
            accepted_at: Utc::now(),
        }
    }
}

/// Observable state of one coordinator (one page lifetime).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorState {
    /// The accepted code, set at most once.
    pub accepted: Option<AcceptedCode>,
    /// Whether the clipboard poll timer is currently armed.
    pub polling_active: bool,
    /// Whether a credential request is outstanding.
    pub push_pending: bool,
    /// Whether the channels are running.
    pub running: bool,
    /// Whether the form was submitted (by the coordinator or another path).
    pub completed: bool,
    /// Number of submissions issued by the coordinator.
    pub submissions: u32,
}

impl CoordinatorState {
    /// Returns true once no further candidate can be accepted.
    pub fn is_settled(&self) -> bool {
        self.accepted.is_some() || self.completed
    }
}

/// Kind of user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// A channel was denied permission.
    PermissionDenied,
    /// The page has no OTP input.
    NoInputTarget,
}

/// A recoverable, non-blocking message for the end user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserNotice {
    /// Kind of notice.
    pub kind: NoticeKind,
    /// Channel the notice relates to, if any.
    pub channel: Option<ChannelKind>,
    /// Human-readable message.
    pub message: String,
}

impl UserNotice {
    /// Builds the notice for an error, if the error is user visible.
    pub fn from_error(error: &AutofillError) -> Option<Self> {
        match error {
            AutofillError::PermissionDenied { channel } => Some(Self {
                kind: NoticeKind::PermissionDenied,
                channel: Some(*channel),
                message: match channel {
                    ChannelKind::Clipboard => {
                        "Clipboard access was denied. Paste the code into the field manually.".to_string()
                    }
                    _ => "Automatic code retrieval was denied. Enter the code manually.".to_string(),
                },
            }),
            AutofillError::NoInputTarget => Some(Self {
                kind: NoticeKind::NoInputTarget,
                channel: None,
                message: "No verification code field was found on this page.".to_string(),
            }),
            _ => None,
        }
    }
}
