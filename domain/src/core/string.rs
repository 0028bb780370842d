//! String utilities for the domain layer.

/// Truncate a string to a maximum byte length, appending a marker line.
///
/// Truncation always lands on a UTF-8 character boundary.
pub fn truncate_output(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len.min(s.len());
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!(
        "{}\n... (output truncated, {} bytes total)",
        &s[..end],
        s.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_input_is_untouched() {
        assert_eq!(truncate_output("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(
            truncate_output("hello world", 5),
            "hello\n... (output truncated, 11 bytes total)"
        );
    }

    #[test]
    fn test_truncate_multibyte_lands_on_boundary() {
        // "é" is 2 bytes; cutting at 3 would split the second one
        let out = truncate_output("éééé", 3);
        assert!(out.starts_with("é\n"));
    }
}
