//! Character-bounded truncation for context and state text.

/// Suffix appended to text that was cut short.
pub const TRUNCATION_MARKER: &str = "\n[truncated]";

/// Truncate `text` to at most `limit` characters.
///
/// When text is cut, the tail is replaced by [`TRUNCATION_MARKER`] so the
/// result still fits in `limit`. The output never exceeds `limit` characters,
/// so truncating twice with the same limit yields the same text.
pub fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let marker_len = TRUNCATION_MARKER.chars().count();
    if limit > marker_len {
        let mut out: String = text.chars().take(limit - marker_len).collect();
        out.push_str(TRUNCATION_MARKER);
        out
    } else {
        text.chars().take(limit).collect()
    }
}

/// Truncate when a limit is configured; pass text through untouched otherwise.
pub fn truncate_to(text: &str, limit: Option<usize>) -> String {
    match limit {
        Some(limit) => truncate(text, limit),
        None => text.to_string(),
    }
}
