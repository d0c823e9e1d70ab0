//! Prompt builder — pure and deterministic: the same source text always
//! renders the same prompt.

use std::borrow::Cow;

use crate::parser::prompts::RESUME_PARSE_PROMPT_TEMPLATE;

/// Character budget for the source text placed into the prompt.
pub const MAX_INPUT_CHARS: usize = 12_000;

/// Appended whenever the source text is cut at the budget.
pub const TRUNCATION_MARKER: &str = "\n[truncated]";

/// Renders the parsing prompt for one run, truncating the source text to
/// the input budget first.
pub fn build_prompt(source_text: &str) -> String {
    let text = truncate(source_text);
    RESUME_PARSE_PROMPT_TEMPLATE.replace("{resume_text}", &text)
}

/// Cuts `s` to at most [`MAX_INPUT_CHARS`] characters, appending
/// [`TRUNCATION_MARKER`] when a cut happens.
///
/// Idempotent: an input that already carries the marker and fits the
/// budget-plus-marker length passes through unchanged, so re-truncating a
/// truncated string yields the same string.
pub fn truncate(s: &str) -> Cow<'_, str> {
    if s.ends_with(TRUNCATION_MARKER) {
        let body_chars = s.chars().count() - TRUNCATION_MARKER.chars().count();
        if body_chars <= MAX_INPUT_CHARS {
            return Cow::Borrowed(s);
        }
    }
    match s.char_indices().nth(MAX_INPUT_CHARS) {
        None => Cow::Borrowed(s),
        Some((cut, _)) => {
            let mut out = String::with_capacity(cut + TRUNCATION_MARKER.len());
            out.push_str(&s[..cut]);
            out.push_str(TRUNCATION_MARKER);
            Cow::Owned(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_passes_through_unchanged() {
        let text = "John Doe\njohn@x.com";
        assert_eq!(truncate(text), text);
    }

    #[test]
    fn test_text_at_budget_is_not_truncated() {
        let text = "x".repeat(MAX_INPUT_CHARS);
        assert_eq!(truncate(&text), text);
    }

    #[test]
    fn test_long_text_is_cut_and_marked() {
        let text = "x".repeat(MAX_INPUT_CHARS + 50);
        let out = truncate(&text);
        assert!(out.ends_with(TRUNCATION_MARKER));
        assert_eq!(
            out.chars().count(),
            MAX_INPUT_CHARS + TRUNCATION_MARKER.chars().count()
        );
    }

    #[test]
    fn test_truncation_is_idempotent() {
        let text = "résumé ".repeat(4_000); // multibyte chars, well past the budget
        let once = truncate(&text).into_owned();
        let twice = truncate(&once).into_owned();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_cut_respects_char_boundaries() {
        let text = "é".repeat(MAX_INPUT_CHARS + 10);
        let out = truncate(&text);
        assert_eq!(
            out.chars().count(),
            MAX_INPUT_CHARS + TRUNCATION_MARKER.chars().count()
        );
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let text = "John Doe\nRust, Tokio, Axum";
        assert_eq!(build_prompt(text), build_prompt(text));
    }

    #[test]
    fn test_prompt_contains_quoted_source_text_and_schema() {
        let prompt = build_prompt("John Doe");
        assert!(prompt.contains("\"John Doe"));
        assert!(prompt.contains("\"personal_info\""));
        assert!(prompt.contains("\"work_experience\""));
        assert!(prompt.contains("\"years_of_experience\""));
        assert!(prompt.contains("\"additional_info\""));
        assert!(!prompt.contains("{resume_text}"));
    }

    #[test]
    fn test_prompt_truncates_oversized_input() {
        let text = "skill, ".repeat(5_000);
        let prompt = build_prompt(&text);
        assert!(prompt.contains(TRUNCATION_MARKER));
    }
}
