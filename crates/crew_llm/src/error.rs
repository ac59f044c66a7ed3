//! Error types for LLM access.

use thiserror::Error;

/// Result type for LLM operations
pub type LlmResult<T> = Result<T, LlmError>;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    /// A required environment variable is missing or empty
    #[error("{0} is not set. Put it in your .env file or export it.")]
    MissingEnv(String),

    /// The MODEL string names a provider we do not speak to
    #[error("Unsupported model provider '{provider}' in '{model}'")]
    UnsupportedProvider { provider: String, model: String },

    /// The MODEL string is empty or has no model name
    #[error("Invalid MODEL value '{0}', expected <provider>/<model>")]
    InvalidModel(String),

    /// Request could not be sent
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("{provider} API error {status}: {body}")]
    Api {
        provider: String,
        status: u16,
        body: String,
    },

    /// Response body did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    /// Whether this error comes from configuration rather than the remote call.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingEnv(_) | Self::InvalidModel(_) | Self::UnsupportedProvider { .. }
        )
    }
}
