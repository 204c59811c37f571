//! Text helpers for wire values and error excerpts.

/// Longest slice of a server body carried inside an error.
pub const EXCERPT_CHARS: usize = 180;

/// Trimmed copy of `value`; `None` when absent or blank.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_owned)
}

/// Trimmed prefix of a response body, short enough for an error message.
pub fn excerpt(value: &str) -> String {
    value.trim().chars().take(EXCERPT_CHARS).collect()
}
