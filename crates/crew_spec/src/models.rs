//! Data models for structured stage output.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::validator::KeywordSpecValidator;

/// Stylistic register of the generated content.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Informative,
    Persuasive,
    Narrative,
    Technical,
    Casual,
    Formal,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Informative => "informative",
            Tone::Persuasive => "persuasive",
            Tone::Narrative => "narrative",
            Tone::Technical => "technical",
            Tone::Casual => "casual",
            Tone::Formal => "formal",
        }
    }

    pub fn all() -> [Tone; 6] {
        [
            Tone::Informative,
            Tone::Persuasive,
            Tone::Narrative,
            Tone::Technical,
            Tone::Casual,
            Tone::Formal,
        ]
    }

    /// Map any string onto the closed set.
    ///
    /// The trimmed value must match one of the lowercase names exactly;
    /// everything else (including near-misses like `"Formal"`) becomes
    /// [`Tone::Informative`].
    pub fn normalize(value: &str) -> Self {
        let value = value.trim();
        Self::all()
            .into_iter()
            .find(|tone| tone.as_str() == value)
            .unwrap_or_default()
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_tone() -> String {
    Tone::default().as_str().to_string()
}

/// Candidate keyword record as produced by the extraction stage.
///
/// Nothing here is trusted; run it through
/// [`KeywordSpecValidator::validate`](crate::KeywordSpecValidator::validate).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawKeywordSpec {
    pub primary_keywords: Vec<String>,
    #[serde(default)]
    pub secondary_keywords: Vec<String>,
    pub audience: String,
    #[serde(default = "default_tone")]
    pub tone: String,
}

impl RawKeywordSpec {
    pub fn new(primary_keywords: Vec<String>, audience: impl Into<String>) -> Self {
        Self {
            primary_keywords,
            secondary_keywords: Vec::new(),
            audience: audience.into(),
            tone: default_tone(),
        }
    }

    pub fn with_secondary(mut self, keywords: Vec<String>) -> Self {
        self.secondary_keywords = keywords;
        self
    }

    pub fn with_tone(mut self, tone: impl Into<String>) -> Self {
        self.tone = tone.into();
        self
    }
}

/// Validated keyword contract handed to downstream stages.
///
/// Deserializing goes through [`RawKeywordSpec`] and the validator, so a
/// `KeywordSpec` read back from JSON upholds the same invariants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawKeywordSpec")]
pub struct KeywordSpec {
    pub(crate) primary_keywords: Vec<String>,
    pub(crate) secondary_keywords: Vec<String>,
    pub(crate) audience: String,
    pub(crate) tone: Tone,
}

impl KeywordSpec {
    pub fn primary_keywords(&self) -> &[String] {
        &self.primary_keywords
    }

    pub fn secondary_keywords(&self) -> &[String] {
        &self.secondary_keywords
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }

    /// Convert back into an unvalidated record.
    pub fn into_raw(self) -> RawKeywordSpec {
        RawKeywordSpec {
            primary_keywords: self.primary_keywords,
            secondary_keywords: self.secondary_keywords,
            audience: self.audience,
            tone: self.tone.as_str().to_string(),
        }
    }
}

impl TryFrom<RawKeywordSpec> for KeywordSpec {
    type Error = ValidationError;

    fn try_from(raw: RawKeywordSpec) -> Result<Self, Self::Error> {
        KeywordSpecValidator::validate(raw)
    }
}
