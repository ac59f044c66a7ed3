//! Keyword record validation and normalization.

use std::collections::HashSet;

use tracing::debug;

use crate::error::{KeywordField, ValidationError};
use crate::models::{KeywordSpec, RawKeywordSpec, Tone};

/// Maximum number of primary keywords.
pub const MAX_PRIMARY_KEYWORDS: usize = 10;

/// Maximum number of secondary keywords.
pub const MAX_SECONDARY_KEYWORDS: usize = 15;

/// Minimum audience length in characters.
pub const MIN_AUDIENCE_LEN: usize = 3;

/// Maximum audience length in characters.
pub const MAX_AUDIENCE_LEN: usize = 80;

/// Trim, drop empties and remove case-insensitive repeats.
///
/// The first occurrence of each lowercased key wins and keeps its
/// (trimmed) original casing; output order follows first occurrence.
pub fn dedupe_keywords<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for value in values {
        let keyword = value.as_ref().trim();
        if keyword.is_empty() {
            continue;
        }
        if seen.insert(keyword.to_lowercase()) {
            out.push(keyword.to_string());
        }
    }

    out
}

/// Validator for keyword extraction output.
pub struct KeywordSpecValidator;

impl KeywordSpecValidator {
    /// Normalize a raw record into a [`KeywordSpec`].
    ///
    /// Keyword and audience problems are hard failures; an unknown tone is
    /// quietly replaced with `informative`.
    pub fn validate(raw: RawKeywordSpec) -> Result<KeywordSpec, ValidationError> {
        let primary_keywords = dedupe_keywords(&raw.primary_keywords);
        if primary_keywords.is_empty() {
            return Err(ValidationError::EmptyPrimaryKeywords);
        }
        Self::check_cardinality(KeywordField::Primary, &primary_keywords, MAX_PRIMARY_KEYWORDS)?;

        let secondary_keywords = dedupe_keywords(&raw.secondary_keywords);
        Self::check_cardinality(
            KeywordField::Secondary,
            &secondary_keywords,
            MAX_SECONDARY_KEYWORDS,
        )?;

        let length = raw.audience.chars().count();
        if !(MIN_AUDIENCE_LEN..=MAX_AUDIENCE_LEN).contains(&length) {
            return Err(ValidationError::AudienceLengthOutOfRange {
                length,
                min: MIN_AUDIENCE_LEN,
                max: MAX_AUDIENCE_LEN,
            });
        }

        let tone = Tone::normalize(&raw.tone);
        if tone.as_str() != raw.tone.trim() {
            debug!("Coercing unknown tone {:?} to {}", raw.tone, tone);
        }

        Ok(KeywordSpec {
            primary_keywords,
            secondary_keywords,
            audience: raw.audience,
            tone,
        })
    }

    fn check_cardinality(
        field: KeywordField,
        keywords: &[String],
        max: usize,
    ) -> Result<(), ValidationError> {
        if keywords.len() > max {
            return Err(ValidationError::TooManyKeywords {
                field,
                max,
                actual: keywords.len(),
            });
        }
        Ok(())
    }
}
