//! Shared text helpers.

/// Remove Markdown code fences (```` ```json ```` and ```` ``` ````) that
/// models wrap around JSON, then trim.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// First `max` characters of `text`, with an ellipsis when cut.
pub fn preview(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences_json_block() {
        let text = "```json\n[\"a\", \"b\"]\n```";
        assert_eq!(strip_code_fences(text), r#"["a", "b"]"#);
    }

    #[test]
    fn test_strip_code_fences_plain_block() {
        assert_eq!(strip_code_fences("```\n[1]\n```\n"), "[1]");
    }

    #[test]
    fn test_strip_code_fences_no_fences() {
        assert_eq!(strip_code_fences("  [\"x\"] "), r#"["x"]"#);
    }

    #[test]
    fn test_preview_cuts_on_char_boundary() {
        assert_eq!(preview("zażółć", 3), "zaż…");
        assert_eq!(preview("short", 10), "short");
    }
}
