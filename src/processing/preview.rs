//! Bounded document previews for classification.

/// Default preview budget, roughly the first 2-3 pages of a document.
pub const PREVIEW_MAX_CHARS: usize = 5000;

/// Return a preview of at most `max_chars` characters, preferring to cut at
/// the last sentence terminator (". ") or paragraph break ("\n\n") when one
/// falls in the final fifth of the budget. Mid-sentence truncation feeds the
/// classifier a noisier signal, so a slightly shorter clean cut wins.
pub fn preview(full_text: &str, max_chars: usize) -> &str {
    let prefix = match full_text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &full_text[..byte_idx],
        None => return full_text,
    };

    let last_period = prefix.rfind(". ");
    let last_break = prefix.rfind("\n\n");
    let break_point = match (last_period, last_break) {
        (Some(p), Some(b)) => Some(p.max(b)),
        (Some(p), None) => Some(p),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    };

    match break_point {
        // Both terminators start with an ASCII byte, so +1 stays on a char
        // boundary; the cut keeps the '.' or first '\n'.
        Some(point) if prefix[..point].chars().count() > max_chars * 4 / 5 => &prefix[..point + 1],
        _ => prefix,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_returned_unchanged() {
        let text = "A short side letter.";
        assert_eq!(preview(text, PREVIEW_MAX_CHARS), text);
    }

    #[test]
    fn text_exactly_at_budget_unchanged() {
        let text = "x".repeat(100);
        assert_eq!(preview(&text, 100), text);
    }

    #[test]
    fn cuts_at_late_sentence_boundary() {
        // Sentence boundary lands at index 90, past 80% of the budget.
        let mut text = "a".repeat(89);
        text.push_str(". ");
        text.push_str(&"b".repeat(50));
        let result = preview(&text, 100);
        assert_eq!(result.len(), 90);
        assert!(result.ends_with('.'));
    }

    #[test]
    fn cuts_at_paragraph_break() {
        let mut text = "a".repeat(95);
        text.push_str("\n\n");
        text.push_str(&"b".repeat(50));
        let result = preview(&text, 100);
        assert_eq!(result.len(), 96);
        assert!(result.ends_with('\n'));
    }

    #[test]
    fn early_boundary_ignored() {
        // Only boundary is at 10% of the budget; raw prefix wins.
        let mut text = "a".repeat(9);
        text.push_str(". ");
        text.push_str(&"b".repeat(200));
        let result = preview(&text, 100);
        assert_eq!(result.chars().count(), 100);
    }

    #[test]
    fn no_boundary_returns_raw_prefix() {
        let text = "x".repeat(300);
        assert_eq!(preview(&text, 100).len(), 100);
    }

    #[test]
    fn multibyte_text_cut_on_char_boundary() {
        let text = "é".repeat(300);
        let result = preview(&text, 100);
        assert_eq!(result.chars().count(), 100);
    }
}
