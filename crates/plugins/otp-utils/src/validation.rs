//! Candidate validation.

use otp_autofill_core::config::CoordinatorConfig;
use otp_autofill_core::error::{AutofillError, AutofillResult};

/// The accepted shape of a one-time passcode: an all-digit string of
/// bounded length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeFormat {
    /// Minimum number of digits.
    pub min_digits: usize,
    /// Maximum number of digits.
    pub max_digits: usize,
}

impl Default for CodeFormat {
    fn default() -> Self {
        Self {
            min_digits: 4,
            max_digits: 6,
        }
    }
}

impl CodeFormat {
    /// Creates a format accepting `min..=max` digits.
    pub fn new(min_digits: usize, max_digits: usize) -> Self {
        Self {
            min_digits,
            max_digits,
        }
    }

    /// Creates the format described by a coordinator config.
    pub fn from_config(config: &CoordinatorConfig) -> Self {
        Self::new(config.min_digits, config.max_digits)
    }

    /// Returns true if `len` digits fit this format.
    pub fn accepts_len(&self, len: usize) -> bool {
        (self.min_digits..=self.max_digits).contains(&len)
    }

    /// Trims surrounding whitespace and checks the remaining text is a code.
    ///
    /// Only ASCII digits count; full-width or other script digits are rejected.
    pub fn normalize(&self, raw: &str) -> AutofillResult<String> {
        let trimmed = raw.trim();
        if self.accepts_len(trimmed.len()) && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            Ok(trimmed.to_string())
        } else {
            Err(AutofillError::invalid_format(raw))
        }
    }

    /// Returns true if `raw` normalizes to a code.
    pub fn is_valid(&self, raw: &str) -> bool {
        self.normalize(raw).is_ok()
    }
}

/// Normalizes a candidate with the default 4 to 6 digit format.
pub fn normalize_code(raw: &str) -> AutofillResult<String> {
    CodeFormat::default().normalize(raw)
}
