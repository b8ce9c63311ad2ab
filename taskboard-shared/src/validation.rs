/// Input normalization and field-level checks
///
/// Free-text fields go through the same pipeline everywhere: trim and
/// escape embedded markup, then check required-but-non-empty, then the
/// field's domain rule. The first failing rule for a field is the single
/// error surfaced to the caller.
///
/// # Example
///
/// ```
/// use taskboard_shared::validation::{capitalize, sanitize};
///
/// assert_eq!(sanitize("  <b>fix</b> bug  "), "&lt;b&gt;fix&lt;&#x2F;b&gt; bug");
/// assert_eq!(capitalize("fix BUG"), "Fix bug");
/// ```

use uuid::Uuid;

/// Error type for field validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// Required field missing or empty after trimming
    #[error("{0} value is required.")]
    Required(&'static str),

    /// Identifier not in the canonical format
    #[error("{0} must be a valid UUID")]
    InvalidId(&'static str),
}

/// Trims a value and escapes embedded markup and control characters
///
/// The escape set covers embedded markup and the characters that break out
/// of HTML attribute context: `& < > " ' / \` and the backtick.
pub fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.trim().chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Capitalizes a value for storage: first character uppercased, the
/// remainder lowercased
///
/// This is the write-time normalization rule for names and descriptions,
/// so "fix BUG" and "Fix bug" are the same stored content.
pub fn capitalize(input: &str) -> String {
    let lowered = input.to_lowercase();
    let mut chars = lowered.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Checks that a required field survived sanitization non-empty
pub fn require_non_empty(field: &'static str, value: &str) -> Result<(), FieldError> {
    if value.is_empty() {
        Err(FieldError::Required(field))
    } else {
        Ok(())
    }
}

/// Parses an identifier in the persistence layer's canonical format
///
/// Runs before any lookup; a malformed identifier never reaches the
/// database.
pub fn parse_id(field: &'static str, value: &str) -> Result<Uuid, FieldError> {
    Uuid::parse_str(value.trim()).map_err(|_| FieldError::InvalidId(field))
}
