//! Pull the JSON payload out of chatty model output.

/// Slice from the first `[` to the last `]`, if both exist in that order.
pub fn json_array(content: &str) -> Option<&str> {
    let start = content.find('[')?;
    let end = content.rfind(']')?;
    (end > start).then(|| &content[start..=end])
}

/// Slice from the first `{` to the last `}`, if both exist in that order.
pub fn json_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (end > start).then(|| &content[start..=end])
}

/// Remove a leading code fence (optionally tagged `json`) and a trailing one.
pub fn strip_code_fences(content: &str) -> &str {
    let mut text = content.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = rest.strip_prefix("json").unwrap_or(rest);
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Cut `text` to at most `max_chars` bytes on a UTF-8 char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    if text.len() <= max_chars {
        return text;
    }
    let mut end = max_chars;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_array_embedded_in_text() {
        let input = "Here you go:\n[{\"id\": 1}]\nEnjoy!";
        assert_eq!(json_array(input), Some("[{\"id\": 1}]"));
    }

    #[test]
    fn test_json_array_missing_closing_bracket() {
        assert_eq!(json_array("[\"partial"), None);
        assert_eq!(json_array("] backwards ["), None);
    }

    #[test]
    fn test_json_object_in_markdown() {
        let input = "```json\n{\"diagram\": \"graph TD\"}\n```";
        assert_eq!(json_object(input), Some("{\"diagram\": \"graph TD\"}"));
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(strip_code_fences("```\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("  [3]  "), "[3]");
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        let text = "héllo";
        assert_eq!(truncate_chars(text, 2), "h");
        assert_eq!(truncate_chars(text, 3), "hé");
        assert_eq!(truncate_chars(text, 100), "héllo");
    }
}
