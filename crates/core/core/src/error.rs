//! Error types for OTP autofill.
//!
//! This module defines the `AutofillError` enum which represents every
//! failure an acquisition channel, the form sink or the configuration can
//! report. None of them is fatal to the page: channel failures are caught
//! at the channel boundary and only a few kinds reach the end user.

use thiserror::Error;

use crate::types::ChannelKind;

/// The main error type for OTP autofill operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutofillError {
    // ==================== Capability Errors ====================
    /// The user or the platform denied access to a capability.
    #[error("Permission denied for {channel} channel")]
    PermissionDenied { channel: ChannelKind },

    /// The capability is absent on this platform.
    #[error("Unsupported capability: {capability}")]
    Unsupported { capability: String },

    /// The operation was cancelled through its abort signal.
    #[error("Operation aborted")]
    Aborted,

    /// The platform rejected the call because of its current state.
    #[error("Invalid state: {message}")]
    InvalidState { message: String },

    /// The clipboard could not be accessed for a reason other than permission.
    #[error("Clipboard unavailable: {message}")]
    ClipboardUnavailable { message: String },

    // ==================== Candidate Errors ====================
    /// A candidate failed the digit-pattern check.
    #[error("Invalid code format: {value:?}")]
    InvalidFormat { value: String },

    // ==================== Form Errors ====================
    /// The page has no OTP input to write to.
    #[error("No OTP input target on the page")]
    NoInputTarget,

    // ==================== Configuration Errors ====================
    /// The configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    // ==================== Internal Errors ====================
    /// An internal error occurred.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AutofillError {
    /// Creates a new permission denied error for a channel.
    pub fn permission_denied(channel: ChannelKind) -> Self {
        Self::PermissionDenied { channel }
    }

    /// Creates a new unsupported capability error.
    pub fn unsupported(capability: impl Into<String>) -> Self {
        Self::Unsupported {
            capability: capability.into(),
        }
    }

    /// Creates a new invalid state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Creates a new invalid format error.
    pub fn invalid_format(value: impl Into<String>) -> Self {
        Self::InvalidFormat {
            value: value.into(),
        }
    }

    /// Creates a new clipboard unavailable error.
    pub fn clipboard(message: impl Into<String>) -> Self {
        Self::ClipboardUnavailable {
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if the end user should see a non-blocking notice.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. } | Self::NoInputTarget)
    }

    /// Returns true if this error comes from an intentional cancellation.
    pub fn is_abort(&self) -> bool {
        matches!(self, Self::Aborted)
    }

    /// Returns a stable error code for logs and event payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Self::PermissionDenied { .. } => "PERMISSION_DENIED",
            Self::Unsupported { .. } => "UNSUPPORTED",
            Self::Aborted => "ABORTED",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::ClipboardUnavailable { .. } => "CLIPBOARD_UNAVAILABLE",
            Self::InvalidFormat { .. } => "INVALID_FORMAT",
            Self::NoInputTarget => "NO_INPUT_TARGET",
            Self::Configuration { .. } => "CONFIGURATION",
            Self::Internal { .. } => "INTERNAL",
        }
    }
}

/// A Result type alias using AutofillError.
pub type AutofillResult<T> = Result<T, AutofillError>;

impl From<serde_json::Error> for AutofillError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal {
            message: err.to_string(),
        }
    }
}
