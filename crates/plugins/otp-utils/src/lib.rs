//! # OTP Autofill Utilities
//!
//! Shared code-handling utilities for the OTP autofill crates:
//! - Candidate validation (trimmed, all-digit, bounded length)
//! - Code extraction from free text
//! - Numeric code generation

mod extraction;
mod generator;
mod validation;

pub use extraction::{extract_all, extract_code};
pub use generator::OtpGenerator;
pub use validation::{normalize_code, CodeFormat};
