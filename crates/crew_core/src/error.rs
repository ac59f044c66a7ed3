//! Error types for the core module.

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur during pipeline execution.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Stage not found: {0}")]
    StageNotFound(String),

    #[error("Stage execution failed: {stage} - {message}")]
    StageExecutionFailed { stage: String, message: String },

    #[error("Stage '{stage}' failed")]
    StageFailed {
        stage: String,
        #[source]
        source: Box<CoreError>,
    },

    #[error("Dependency not satisfied for stage {stage}: missing {key}")]
    DependencyNotSatisfied { stage: String, key: String },

    #[error(transparent)]
    Stage(Box<dyn std::error::Error + Send + Sync>),

    #[error("Structured output of stage '{stage}' does not match: {message}")]
    Serialization { stage: String, message: String },
}

impl CoreError {
    /// Wrap an error raised inside a stage implementation.
    pub fn stage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Stage(Box::new(err))
    }

    /// The error raised inside a stage implementation, looking through
    /// [`StageFailed`](Self::StageFailed).
    pub fn stage_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::StageFailed { source, .. } => source.stage_error(),
            Self::Stage(inner) => Some(&**inner),
            _ => None,
        }
    }
}
