//! Extraction of structured records from raw LLM text.
//!
//! Models rarely return a bare JSON document: the object tends to come
//! wrapped in a markdown fence or surrounded by a sentence or two. The
//! helpers here locate the object and hand it to the validator.

use tracing::debug;

use crate::error::{SpecError, SpecResult};
use crate::models::{KeywordSpec, RawKeywordSpec};
use crate::validator::KeywordSpecValidator;

/// Locate the first complete JSON object in `text`.
///
/// A fenced ```` ```json ```` block is preferred when present; otherwise
/// the first balanced `{ ... }` span is returned. Braces inside string
/// literals are ignored.
pub fn extract_json_object(text: &str) -> Option<&str> {
    json_object_candidates(text).next()
}

/// Every balanced `{ ... }` span in `text`, in the order they should be
/// tried: spans inside a fenced block first, then spans of the whole text
/// by starting position.
pub fn json_object_candidates(text: &str) -> impl Iterator<Item = &str> {
    let fenced = fenced_block(text)
        .into_iter()
        .flat_map(|block| balanced_objects(block));
    fenced.chain(balanced_objects(text))
}

fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after_fence = &text[start + 3..];
    // skip the info string ("json", "JSON", ...)
    let body_start = after_fence.find('\n')? + 1;
    let body = &after_fence[body_start..];
    let end = body.find("```")?;
    Some(&body[..end])
}

fn balanced_objects(text: &str) -> impl Iterator<Item = &str> {
    text.match_indices('{')
        .filter_map(move |(start, _)| balanced_object_at(text, start))
}

fn balanced_object_at(text: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse the raw candidate record out of stage output.
///
/// Candidates are tried in order until one deserializes. When none does,
/// the error of the first candidate is reported.
pub fn parse_raw_keyword_spec(text: &str) -> SpecResult<RawKeywordSpec> {
    let mut first_error = None;

    for object in json_object_candidates(text) {
        match serde_json::from_str(object) {
            Ok(raw) => {
                debug!("Extracted structured output ({} bytes)", object.len());
                return Ok(raw);
            }
            Err(e) => {
                debug!("Skipping candidate object ({} bytes): {}", object.len(), e);
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    Err(match first_error {
        Some(e) => SpecError::MalformedOutput(e.to_string()),
        None => SpecError::NoStructuredOutput,
    })
}

/// Parse and validate a [`KeywordSpec`] from stage output.
pub fn parse_keyword_spec(text: &str) -> SpecResult<KeywordSpec> {
    let raw = parse_raw_keyword_spec(text)?;
    Ok(KeywordSpecValidator::validate(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    #[test]
    fn test_extract_bare_object() {
        let text = r#"{"a": 1}"#;
        assert_eq!(extract_json_object(text), Some(text));
    }

    #[test]
    fn test_extract_fenced_object() {
        let text = "Here you go:\n```json\n{\"a\": {\"b\": 2}}\n```\nThanks!";
        assert_eq!(extract_json_object(text), Some("{\"a\": {\"b\": 2}}"));
    }

    #[test]
    fn test_extract_ignores_braces_in_strings() {
        let text = r#"Result: {"audience": "people who write { and }", "x": "\"}"} trailing"#;
        assert_eq!(
            extract_json_object(text),
            Some(r#"{"audience": "people who write { and }", "x": "\"}"}"#)
        );
    }

    #[test]
    fn test_extract_unbalanced() {
        assert_eq!(extract_json_object("{\"a\": 1"), None);
        assert_eq!(extract_json_object("no json here"), None);
    }

    #[test]
    fn test_parse_keyword_spec_from_prose() {
        let text = "Final Answer:\n```json\n{\"primary_keywords\": [\"AI\", \"ai\", \"Health\"], \"audience\": \"rural clinicians\", \"tone\": \"Dramatic\"}\n```";
        let spec = parse_keyword_spec(text).unwrap();
        assert_eq!(spec.primary_keywords(), ["AI", "Health"]);
        assert_eq!(spec.tone().as_str(), "informative");
    }

    #[test]
    fn test_parse_keyword_spec_missing_field() {
        let err = parse_keyword_spec(r#"{"primary_keywords": ["AI"]}"#).unwrap_err();
        assert!(matches!(err, SpecError::MalformedOutput(_)));
    }

    #[test]
    fn test_parse_keyword_spec_validation_error() {
        let err = parse_keyword_spec(r#"{"primary_keywords": ["AI"], "audience": "ab"}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            SpecError::Validation(ValidationError::AudienceLengthOutOfRange { length: 2, .. })
        ));
    }

    #[test]
    fn test_parse_keyword_spec_after_braces_in_prose() {
        let text = "For {topic} I chose these:\n{\"primary_keywords\": [\"AI\"], \"audience\": \"rural nurses\"}";
        let spec = parse_keyword_spec(text).unwrap();
        assert_eq!(spec.primary_keywords(), ["AI"]);
        assert_eq!(spec.audience(), "rural nurses");
    }

    #[test]
    fn test_candidates_in_order() {
        let text = "{x} then ```json\n{\"a\": 1}\n```";
        let candidates: Vec<&str> = json_object_candidates(text).collect();
        assert_eq!(candidates, ["{\"a\": 1}", "{x}", "{\"a\": 1}"]);
    }

    #[test]
    fn test_parse_keyword_spec_no_object() {
        let err = parse_keyword_spec("I could not find any keywords.").unwrap_err();
        assert!(matches!(err, SpecError::NoStructuredOutput));
    }
}
