//! Question text sanitization.
//!
//! OCR output is noisy: stray punctuation, box-drawing artifacts, non-ASCII
//! confusions. Only a small whitelist of characters survives before the text
//! is sent to the answer endpoint.

/// Check whether a character is allowed in a question.
///
/// Allowed: ASCII letters, ASCII digits, whitespace, and `? . , !`.
fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || c.is_whitespace() || matches!(c, '?' | '.' | ',' | '!')
}

/// Strip disallowed characters from OCR output and trim the result.
///
/// Deterministic and total; filtering an already-filtered string returns it
/// unchanged.
pub fn filter_question(text: &str) -> String {
    text.chars().filter(|c| is_allowed(*c)).collect::<String>().trim().to_string()
}
