//! Coordinator configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{AutofillError, AutofillResult};
use crate::types::Transport;

/// Configuration for the OTP acquisition coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Clipboard poll period in milliseconds. Default: 2000.
    pub poll_interval_ms: u64,
    /// Minimum number of digits in a code. Default: 4.
    pub min_digits: usize,
    /// Maximum number of digits in a code. Default: 6.
    pub max_digits: usize,
    /// Transports requested from the credential source. Default: sms.
    pub transports: Vec<Transport>,
    /// Cache key the accepted code is stored under. Default: "otp".
    pub cache_key: String,
    /// Treat a valid cached code as already accepted on start. Default: false.
    pub restore_from_cache: bool,
    /// Source name stamped on published events.
    pub event_source: String,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2000,
            min_digits: 4,
            max_digits: 6,
            transports: vec![Transport::Sms],
            cache_key: "otp".to_string(),
            restore_from_cache: false,
            event_source: "otp_autofill.coordinator".to_string(),
        }
    }
}

impl CoordinatorConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the poll interval in milliseconds.
    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Sets the accepted digit range.
    pub fn digits(mut self, min: usize, max: usize) -> Self {
        self.min_digits = min;
        self.max_digits = max;
        self
    }

    /// Sets the credential transports.
    pub fn transports(mut self, transports: Vec<Transport>) -> Self {
        self.transports = transports;
        self
    }

    /// Sets the cache key.
    pub fn cache_key(mut self, key: impl Into<String>) -> Self {
        self.cache_key = key.into();
        self
    }

    /// Restores a cached code as accepted when starting.
    pub fn restore_from_cache(mut self) -> Self {
        self.restore_from_cache = true;
        self
    }

    /// Returns the poll interval.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Checks the configuration for impossible values.
    pub fn validate(&self) -> AutofillResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(AutofillError::config("poll_interval_ms must be greater than zero"));
        }
        if self.min_digits == 0 || self.max_digits > 10 {
            return Err(AutofillError::config("digit bounds must lie within 1..=10"));
        }
        if self.min_digits > self.max_digits {
            return Err(AutofillError::config(format!(
                "min_digits ({}) exceeds max_digits ({})",
                self.min_digits, self.max_digits
            )));
        }
        if self.cache_key.is_empty() {
            return Err(AutofillError::config("cache_key must not be empty"));
        }
        Ok(())
    }
}
