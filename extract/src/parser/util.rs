//! Shared text helpers for the report parsers and the page normalizer.

/// Collapses every whitespace run to a single space and trims both ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns the first `max_chars` characters of `text`, never splitting a
/// UTF-8 sequence.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Truncates to `max_chars` characters and appends `...` when anything was cut.
pub fn ellipsize(text: &str, max_chars: usize) -> String {
    let cut = truncate_chars(text, max_chars);
    if cut.len() < text.len() {
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

/// Returns `true` when the line begins with a space or tab.
pub fn is_indented(line: &str) -> bool {
    line.starts_with(' ') || line.starts_with('\t')
}
