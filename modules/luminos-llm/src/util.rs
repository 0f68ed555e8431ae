/// Truncate a string to at most `max_bytes` bytes at a character boundary.
pub fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_on_char_boundary() {
        let text = "गड्ढा on road";
        let truncated = truncate_to_char_boundary(text, 4);
        assert!(truncated.len() <= 4);
        assert!(text.starts_with(truncated));
    }

    #[test]
    fn leaves_short_strings_alone() {
        assert_eq!(truncate_to_char_boundary("pothole", 100), "pothole");
    }
}
