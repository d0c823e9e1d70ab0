//! Output extractor — recovers a JSON value from free-form model output.
//!
//! Models wrap JSON in explanatory prose or markdown fences, or emit
//! partial JSON. `extract` never fails: every input maps to a parsed value
//! or a [`Diagnostic`], itself an always-valid JSON payload that carries
//! the raw output for inspection.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

/// Classification of a recoverable extraction failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    EmptyOutput,
    NoJsonFound,
    ParseError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::EmptyOutput => "EMPTY_OUTPUT",
            ErrorKind::NoJsonFound => "NO_JSON_FOUND",
            ErrorKind::ParseError => "PARSE_ERROR",
        }
    }
}

/// A recoverable extraction failure, returned to the caller as JSON rather
/// than raised as an error. `raw_output` is the full model output for
/// `EMPTY_OUTPUT` and `NO_JSON_FOUND`, and the extracted span only for
/// `PARSE_ERROR`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub error_kind: ErrorKind,
    pub raw_output: String,
}

impl Diagnostic {
    pub fn into_value(self) -> Value {
        json!({
            "error_kind": self.error_kind.as_str(),
            "raw_output": self.raw_output,
        })
    }
}

/// Outcome of one extraction. A parsed value is shape-unverified: any JSON
/// the model produced is accepted as-is, with no schema validation.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredResult {
    Parsed(Value),
    Diagnostic(Diagnostic),
}

impl StructuredResult {
    pub fn into_value(self) -> Value {
        match self {
            StructuredResult::Parsed(value) => value,
            StructuredResult::Diagnostic(diagnostic) => diagnostic.into_value(),
        }
    }
}

/// Locates the span of text most plausibly holding an embedded JSON value.
/// Pluggable so the recovery heuristic can be swapped without changing the
/// extractor's contract.
pub trait JsonSpanLocator: Send + Sync {
    fn locate<'a>(&self, text: &'a str) -> Option<&'a str>;
}

/// Greedy span match: first `{` to last `}`, falling back to first `[` to
/// last `]`.
///
/// Known limitation, kept on purpose: when the surrounding text itself
/// contains a brace past the true closing one (including inside string
/// values), the span overshoots and the parse fails with `PARSE_ERROR`.
/// Use [`BalancedSpan`] where that matters.
pub struct GreedySpan;

impl JsonSpanLocator for GreedySpan {
    fn locate<'a>(&self, text: &'a str) -> Option<&'a str> {
        span_between(text, '{', '}').or_else(|| span_between(text, '[', ']'))
    }
}

fn span_between(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    // The delimiters are ASCII, so end + 1 is a char boundary.
    (end >= start).then(|| &text[start..=end])
}

/// Stricter alternative to [`GreedySpan`]: walks from the first opening
/// delimiter tracking nesting depth and string/escape state, and stops at
/// the matching close.
pub struct BalancedSpan;

impl JsonSpanLocator for BalancedSpan {
    fn locate<'a>(&self, text: &'a str) -> Option<&'a str> {
        let start = text.find(['{', '['])?;
        let mut depth: u32 = 0;
        let mut in_string = false;
        let mut escaped = false;

        for (i, c) in text[start..].char_indices() {
            if in_string {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '"' {
                    in_string = false;
                }
                continue;
            }
            match c {
                '"' => in_string = true,
                '{' | '[' => depth += 1,
                '}' | ']' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Some(&text[start..start + i + c.len_utf8()]);
                    }
                }
                _ => {}
            }
        }
        None
    }
}

/// Recovers structured output from raw model text. Never fails.
#[derive(Clone)]
pub struct OutputExtractor {
    locator: Arc<dyn JsonSpanLocator>,
}

impl Default for OutputExtractor {
    fn default() -> Self {
        Self::with_locator(Arc::new(GreedySpan))
    }
}

impl OutputExtractor {
    pub fn with_locator(locator: Arc<dyn JsonSpanLocator>) -> Self {
        Self { locator }
    }

    /// Maps every possible input to a [`StructuredResult`]:
    /// empty or whitespace-only ⇒ `EMPTY_OUTPUT`; no bracket span found ⇒
    /// `NO_JSON_FOUND` carrying the original text; span found but not valid
    /// JSON ⇒ `PARSE_ERROR` carrying the span; otherwise the parsed value.
    pub fn extract(&self, raw_output: &str) -> StructuredResult {
        if raw_output.trim().is_empty() {
            return StructuredResult::Diagnostic(Diagnostic {
                error_kind: ErrorKind::EmptyOutput,
                raw_output: raw_output.to_string(),
            });
        }

        let Some(span) = self.locator.locate(raw_output) else {
            return StructuredResult::Diagnostic(Diagnostic {
                error_kind: ErrorKind::NoJsonFound,
                raw_output: raw_output.to_string(),
            });
        };

        match serde_json::from_str::<Value>(span) {
            Ok(value) => StructuredResult::Parsed(value),
            Err(_) => StructuredResult::Diagnostic(Diagnostic {
                error_kind: ErrorKind::ParseError,
                raw_output: span.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(raw: &str) -> StructuredResult {
        OutputExtractor::default().extract(raw)
    }

    fn diagnostic(result: StructuredResult) -> Diagnostic {
        match result {
            StructuredResult::Diagnostic(d) => d,
            other => panic!("expected a diagnostic, got {other:?}"),
        }
    }

    #[test]
    fn test_clean_object_parses() {
        let result = extract(r#"{"name": "John Doe", "skills": ["Rust"]}"#);
        assert_eq!(
            result,
            StructuredResult::Parsed(json!({"name": "John Doe", "skills": ["Rust"]}))
        );
    }

    #[test]
    fn test_object_wrapped_in_prose_parses() {
        let result = extract(r#"Here is the data: {"a": 1} Thanks!"#);
        assert_eq!(result, StructuredResult::Parsed(json!({"a": 1})));
    }

    #[test]
    fn test_object_wrapped_in_markdown_fences_parses() {
        let result = extract("```json\n{\"name\":\"John Doe\"}\n```");
        assert_eq!(result, StructuredResult::Parsed(json!({"name": "John Doe"})));
    }

    #[test]
    fn test_top_level_array_parses() {
        let result = extract(r#"The skills are [1, 2, 3] as requested."#);
        assert_eq!(result, StructuredResult::Parsed(json!([1, 2, 3])));
    }

    #[test]
    fn test_empty_output_diagnostic() {
        let d = diagnostic(extract(""));
        assert_eq!(d.error_kind, ErrorKind::EmptyOutput);
    }

    #[test]
    fn test_whitespace_only_diagnostic() {
        let d = diagnostic(extract("  \n\t "));
        assert_eq!(d.error_kind, ErrorKind::EmptyOutput);
    }

    #[test]
    fn test_no_brackets_diagnostic_preserves_raw_output() {
        let raw = "I could not find any structured data in the resume.";
        let d = diagnostic(extract(raw));
        assert_eq!(d.error_kind, ErrorKind::NoJsonFound);
        assert_eq!(d.raw_output, raw);
    }

    #[test]
    fn test_parse_error_carries_extracted_span_not_full_text() {
        let d = diagnostic(extract(r#"Output: {"a": } done"#));
        assert_eq!(d.error_kind, ErrorKind::ParseError);
        assert_eq!(d.raw_output, r#"{"a": }"#);
    }

    #[test]
    fn test_diagnostic_is_valid_json() {
        let value = diagnostic(extract("no json here")).into_value();
        assert_eq!(value["error_kind"], "NO_JSON_FOUND");
        assert_eq!(value["raw_output"], "no json here");
    }

    /// The greedy heuristic overshoots when a brace follows the true close;
    /// the balanced locator recovers the same input. Both behaviors are
    /// intentional.
    #[test]
    fn test_greedy_overshoot_vs_balanced_recovery() {
        let raw = r#"{"a": 1} and a stray } at the end"#;

        let greedy = diagnostic(extract(raw));
        assert_eq!(greedy.error_kind, ErrorKind::ParseError);
        assert_eq!(greedy.raw_output, r#"{"a": 1} and a stray }"#);

        let balanced = OutputExtractor::with_locator(Arc::new(BalancedSpan)).extract(raw);
        assert_eq!(balanced, StructuredResult::Parsed(json!({"a": 1})));
    }

    #[test]
    fn test_balanced_locator_handles_braces_inside_strings() {
        let raw = r#"prefix {"note": "uses {braces} inside"} suffix"#;
        let balanced = OutputExtractor::with_locator(Arc::new(BalancedSpan)).extract(raw);
        assert_eq!(
            balanced,
            StructuredResult::Parsed(json!({"note": "uses {braces} inside"}))
        );
    }

    #[test]
    fn test_balanced_locator_unclosed_object_is_no_json_found() {
        let d = match OutputExtractor::with_locator(Arc::new(BalancedSpan)).extract(r#"{"a": 1"#) {
            StructuredResult::Diagnostic(d) => d,
            other => panic!("expected a diagnostic, got {other:?}"),
        };
        assert_eq!(d.error_kind, ErrorKind::NoJsonFound);
    }

    #[test]
    fn test_reversed_braces_fall_through_to_no_json_found() {
        let d = diagnostic(extract("} before {"));
        assert_eq!(d.error_kind, ErrorKind::NoJsonFound);
    }

    #[test]
    fn test_parsed_value_is_returned_without_schema_validation() {
        // Any shape is accepted; downstream callers treat success as
        // shape-unverified.
        let result = extract(r#"{"unexpected": true}"#);
        assert_eq!(result, StructuredResult::Parsed(json!({"unexpected": true})));
    }
}
