//! Error types for structured output handling.

use std::fmt;

use thiserror::Error;

/// Result type alias for spec operations.
pub type SpecResult<T> = Result<T, SpecError>;

/// Keyword field of a [`KeywordSpec`](crate::KeywordSpec).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordField {
    Primary,
    Secondary,
}

impl KeywordField {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeywordField::Primary => "primary_keywords",
            KeywordField::Secondary => "secondary_keywords",
        }
    }
}

impl fmt::Display for KeywordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A keyword record that failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("primary_keywords has no non-empty entries after cleaning")]
    EmptyPrimaryKeywords,

    #[error("{field} has {actual} entries, at most {max} allowed")]
    TooManyKeywords {
        field: KeywordField,
        max: usize,
        actual: usize,
    },

    #[error("audience must be between {min} and {max} characters, got {length}")]
    AudienceLengthOutOfRange {
        length: usize,
        min: usize,
        max: usize,
    },
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::EmptyPrimaryKeywords => KeywordField::Primary.as_str(),
            ValidationError::TooManyKeywords { field, .. } => field.as_str(),
            ValidationError::AudienceLengthOutOfRange { .. } => "audience",
        }
    }
}

/// Errors raised while turning raw stage output into a structured record.
#[derive(Error, Debug)]
pub enum SpecError {
    #[error("No JSON object found in stage output")]
    NoStructuredOutput,

    #[error("Malformed structured output: {0}")]
    MalformedOutput(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
