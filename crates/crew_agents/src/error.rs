//! Error types for agents module.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for agent operations.
pub type AgentResult<T> = Result<T, AgentError>;

/// Errors that can occur while configuring or running agents.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Task '{task}' references unknown agent '{agent}'")]
    UnknownAgent { task: String, agent: String },

    #[error("No value for placeholder {{{0}}}")]
    MissingInput(String),

    #[error("Failed to read {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to write {path}: {source}")]
    OutputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Spec(#[from] crew_spec::SpecError),

    #[error(transparent)]
    Core(#[from] crew_core::CoreError),

    #[error(transparent)]
    Llm(#[from] crew_llm::LlmError),
}

impl AgentError {
    /// The keyword validation failure behind this error, if any.
    pub fn validation(&self) -> Option<&crew_spec::ValidationError> {
        match self {
            Self::Spec(crew_spec::SpecError::Validation(err)) => Some(err),
            _ => None,
        }
    }

    /// Whether the error comes from crew configuration or template inputs.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::AgentNotFound(_)
                | Self::TaskNotFound(_)
                | Self::UnknownAgent { .. }
                | Self::MissingInput(_)
                | Self::ConfigFile { .. }
                | Self::Yaml(_)
        )
    }
}

impl From<AgentError> for crew_core::CoreError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Core(inner) => inner,
            other => crew_core::CoreError::stage(other),
        }
    }
}
