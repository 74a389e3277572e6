//! Code extraction from free text such as SMS bodies or window messages.

use crate::validation::CodeFormat;

/// Returns every standalone digit run in `text` whose length fits `format`.
///
/// A run is standalone when it is not directly preceded or followed by
/// another ASCII digit, so `"1234567"` never yields `"12345"`.
pub fn extract_all(text: &str, format: &CodeFormat) -> Vec<String> {
    let mut codes = Vec::new();
    let mut run = String::new();

    for c in text.chars().chain(std::iter::once(' ')) {
        if c.is_ascii_digit() {
            run.push(c);
            continue;
        }
        if format.accepts_len(run.len()) {
            codes.push(std::mem::take(&mut run));
        } else {
            run.clear();
        }
    }

    codes
}

/// Returns the first standalone code in `text`.
///
/// WebOTP-formatted messages end with `@origin #code`; when such a marker
/// is present its code wins over codes elsewhere in the body.
pub fn extract_code(text: &str, format: &CodeFormat) -> Option<String> {
    if let Some(code) = origin_bound_code(text, format) {
        return Some(code);
    }
    extract_all(text, format).into_iter().next()
}

fn origin_bound_code(text: &str, format: &CodeFormat) -> Option<String> {
    let last_line = text.lines().rev().find(|line| !line.trim().is_empty())?;
    let mut parts = last_line.split_whitespace();
    let origin = parts.next()?;
    let marker = parts.next()?;
    if !origin.starts_with('@') {
        return None;
    }
    let code = marker.strip_prefix('#')?;
    format.normalize(code).ok()
}
