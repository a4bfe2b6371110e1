//! Shared helper functions for CLI commands

use crate::core::identity::RecordId;

/// Format a RecordId for display, truncating if too long
///
/// Full ids are 31 characters; tables show the prefix and the start of the
/// ULID, which is enough to tell cans apart within a project.
pub fn format_short_id(id: &RecordId) -> String {
    truncate_str(&id.to_string(), 16)
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
