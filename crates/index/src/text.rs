//! Word normalization shared by every producer and consumer of index terms.
//!
//! Index words and query terms must go through the same functions, otherwise
//! prefix matching compares strings from two different alphabets.

/// Lowercases `text`, drops every character that is neither alphanumeric nor
/// whitespace, and trims the result.
///
/// ```
/// assert_eq!(sift_index::text::clean("  Hello, World! "), "hello world");
/// assert_eq!(sift_index::text::clean("Ünïcode_42"), "ünïcode42");
/// ```
#[must_use]
pub fn clean(text: &str) -> String {
    let kept: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    kept.trim().to_string()
}

/// Cleans `text` and splits it on runs of whitespace.
///
/// Never yields empty tokens; empty or punctuation-only input yields an empty
/// vector.
#[must_use]
pub fn split(text: &str) -> Vec<String> {
    clean(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
