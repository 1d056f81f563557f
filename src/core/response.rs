//! Outgoing text utilities
//!
//! - **Version**: 2.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.1.0: Strip control characters from user text echoed back
//! - 2.0.0: Whisper limits, sendability check and single-line normalization
//! - 1.0.0: Truncation helpers

/// Longest whisper the backend accepts, in characters
pub const MESSAGE_LIMIT: usize = 512;

/// Check text against the usual whisper constraints
///
/// Rejects empty or whitespace-only text, text longer than `MESSAGE_LIMIT`
/// characters, and text containing line breaks or other control characters.
pub fn is_sendable(text: &str) -> bool {
    !text.trim().is_empty()
        && text.chars().count() <= MESSAGE_LIMIT
        && !text.chars().any(char::is_control)
}

/// Truncate text to fit the message limit, adding ellipsis if needed
pub fn truncate_for_message(text: &str) -> String {
    if text.chars().count() <= MESSAGE_LIMIT {
        text.to_string()
    } else {
        // Room for "..."
        let kept: String = text.chars().take(MESSAGE_LIMIT - 3).collect();
        format!("{kept}...")
    }
}

/// Collapse indentation, line breaks and runs of spaces into single spaces
pub fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drop control characters so user-typed text can be echoed in a whisper
pub fn strip_control(text: &str) -> String {
    text.chars().filter(|c| !c.is_control()).collect()
}

/// Wrap every string in `quote`
pub fn enclose<I, S>(items: I, quote: char) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| format!("{quote}{}{quote}", s.as_ref()))
        .collect()
}
