//! Provider selection from the `MODEL` setting.

use std::fmt;
use std::str::FromStr;

use crate::error::LlmError;

/// LLM provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    Gemini,
    OpenAI,
    Anthropic,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => "gemini",
            LlmProvider::OpenAI => "openai",
            LlmProvider::Anthropic => "anthropic",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => "GEMINI_API_KEY",
            LlmProvider::OpenAI => "OPENAI_API_KEY",
            LlmProvider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => "https://generativelanguage.googleapis.com",
            LlmProvider::OpenAI => "https://api.openai.com",
            LlmProvider::Anthropic => "https://api.anthropic.com",
        }
    }

    /// Environment variable that overrides the base URL.
    pub fn base_url_env(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => "GEMINI_BASE_URL",
            LlmProvider::OpenAI => "OPENAI_BASE_URL",
            LlmProvider::Anthropic => "ANTHROPIC_BASE_URL",
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed `MODEL` value such as `gemini/gemini-2.0-flash`.
///
/// A model name without a provider prefix is sent to Gemini.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub provider: LlmProvider,
    pub model: String,
}

impl ModelSpec {
    pub fn new(provider: LlmProvider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    pub fn parse(value: &str) -> Result<Self, LlmError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(LlmError::InvalidModel(value.to_string()));
        }
        let Some((prefix, model)) = value.split_once('/') else {
            return Ok(Self::new(LlmProvider::Gemini, value));
        };

        let provider = match prefix.to_lowercase().as_str() {
            "gemini" | "google" => LlmProvider::Gemini,
            "openai" => LlmProvider::OpenAI,
            "anthropic" => LlmProvider::Anthropic,
            other => {
                return Err(LlmError::UnsupportedProvider {
                    provider: other.to_string(),
                    model: value.to_string(),
                })
            }
        };

        if model.is_empty() {
            return Err(LlmError::InvalidModel(value.to_string()));
        }

        Ok(Self::new(provider, model))
    }
}

impl FromStr for ModelSpec {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}
