// Character-level helpers shared by the handlers

/// Keep at most `max_chars` characters. Returns the kept prefix and whether
/// anything was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => (text[..cut].to_string(), true),
        None => (text.to_string(), false),
    }
}

/// Newline count plus one, so an empty text has one line.
pub fn line_count(text: &str) -> usize {
    text.matches('\n').count() + 1
}
