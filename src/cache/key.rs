//! Key Sanitizer
//!
//! Normalizes externally supplied keys before they reach storage.

/// Returns true for characters allowed in a stored key.
fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

// == Sanitize ==
/// Strips every character that is not an ASCII letter, digit, underscore or hyphen.
///
/// Never fails. Distinct raw keys may collapse to the same sanitized key
/// (`"a b/c"` and `"abc"` both become `"abc"`), and a key made only of
/// disallowed characters becomes the empty string, which is passed through.
pub fn sanitize(raw: &str) -> String {
    raw.chars().filter(|c| is_key_char(*c)).collect()
}
