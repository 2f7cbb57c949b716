//! Extraction of JSON objects from free-form model output.
//!
//! Models asked for "only valid JSON" still wrap it in prose, code fences,
//! or trailing commentary often enough that positional assumptions fail.
//! The extractor scans for the first balanced `{...}` span instead,
//! respecting string literals and escapes.

/// Returns the first balanced JSON object in `text`, or `None` if no
/// complete object is present.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_object() {
        assert_eq!(extract_json_object(r#"{"a": 1}"#), Some(r#"{"a": 1}"#));
    }

    #[test]
    fn object_embedded_in_prose() {
        let text = "Here is the result:\n```json\n{\"verdict\": \"negotiate\"}\n```\nLet me know!";
        assert_eq!(
            extract_json_object(text),
            Some(r#"{"verdict": "negotiate"}"#)
        );
    }

    #[test]
    fn nested_braces() {
        let text = r#"{"outer": {"inner": {"deep": 2}}} trailing"#;
        assert_eq!(
            extract_json_object(text),
            Some(r#"{"outer": {"inner": {"deep": 2}}}"#)
        );
    }

    #[test]
    fn braces_inside_string_literals() {
        let text = r#"{"quote": "see Section 4.2 } and { 4.3"}"#;
        assert_eq!(extract_json_object(text), Some(text));
    }

    #[test]
    fn escaped_quotes_inside_strings() {
        let text = r#"{"title": "the \"key person\" clause"}"#;
        assert_eq!(extract_json_object(text), Some(text));
    }

    #[test]
    fn no_object_present() {
        assert_eq!(extract_json_object("no json here"), None);
    }

    #[test]
    fn unbalanced_object_rejected() {
        assert_eq!(extract_json_object(r#"{"a": {"b": 1}"#), None);
    }

    #[test]
    fn first_of_multiple_objects() {
        let text = r#"{"first": true} {"second": true}"#;
        assert_eq!(extract_json_object(text), Some(r#"{"first": true}"#));
    }

    #[test]
    fn multibyte_text_around_object() {
        let text = "résumé — {\"ok\": \"café\"} — fin";
        assert_eq!(extract_json_object(text), Some("{\"ok\": \"café\"}"));
    }
}
