//! Numeric code generation, used to fabricate SMS deliveries for
//! simulations and tests.

use rand::Rng;

use crate::validation::CodeFormat;

/// Generator for all-digit codes.
#[derive(Debug, Clone)]
pub struct OtpGenerator {
    length: usize,
}

impl OtpGenerator {
    /// Creates a generator for codes of `length` digits.
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    /// Creates a generator for the longest code a format accepts.
    pub fn for_format(format: &CodeFormat) -> Self {
        Self::new(format.max_digits)
    }

    /// Generates a new code.
    pub fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..self.length)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect()
    }
}

impl Default for OtpGenerator {
    fn default() -> Self {
        Self::new(6)
    }
}
