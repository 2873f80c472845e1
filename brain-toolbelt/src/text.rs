//! Char-boundary-safe truncation helpers shared by every prose-producing tool.

/// Truncates `s` at `max_chars` characters (not bytes), appending an ellipsis marker
/// when truncation actually happened.
pub fn truncate_line(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut truncated: String = s.chars().take(max_chars).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_line_is_unchanged() {
        assert_eq!(truncate_line("hello", 500), "hello");
    }

    #[test]
    fn long_line_is_truncated_at_char_boundary() {
        let s = "é".repeat(600);
        let truncated = truncate_line(&s, 500);
        assert_eq!(truncated.chars().count(), 503);
        assert!(truncated.ends_with("..."));
    }
}
