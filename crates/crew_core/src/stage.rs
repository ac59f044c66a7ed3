//! Stage definitions and results.
//!
//! A stage is one step of the pipeline: in storycrew, one agent executing
//! one task. Stages are registered by name in a `StageRegistry` and run
//! in order by the `PipelineExecutor`.
//!
//! # Example
//!
//! ```rust,ignore
//! use async_trait::async_trait;
//! use crew_core::{CoreResult, PipelineContext, Stage, StageInput, StageOutput, StageResult, TaskOutput};
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl Stage for Echo {
//!     fn name(&self) -> &str { "echo" }
//!     fn description(&self) -> &str { "Repeats the topic" }
//!     fn input(&self) -> StageInput { StageInput::new().require_key("topic") }
//!     fn output(&self) -> StageOutput { StageOutput::new().produces_key("echo") }
//!
//!     async fn execute(&self, context: &mut PipelineContext) -> CoreResult<StageResult> {
//!         let topic = context.input("topic").unwrap_or_default().to_string();
//!         context.record_output(TaskOutput::new("echo", topic));
//!         Ok(StageResult::success("echo"))
//!     }
//! }
//! ```

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::PipelineContext;
use crate::error::CoreResult;

/// Describes inputs a stage requires.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageInput {
    /// Keys that must be present as inputs or earlier stage outputs
    pub required_keys: Vec<String>,
    /// Keys used when present
    pub optional_keys: Vec<String>,
}

impl StageInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require_key(mut self, key: impl Into<String>) -> Self {
        self.required_keys.push(key.into());
        self
    }

    pub fn optional_key(mut self, key: impl Into<String>) -> Self {
        self.optional_keys.push(key.into());
        self
    }
}

/// Describes outputs a stage produces.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageOutput {
    pub produces_keys: Vec<String>,
    pub produces_files: Vec<PathBuf>,
}

impl StageOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn produces_key(mut self, key: impl Into<String>) -> Self {
        self.produces_keys.push(key.into());
        self
    }

    pub fn produces_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.produces_files.push(path.into());
        self
    }
}

/// Result from stage execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageResult {
    pub stage: String,
    pub success: bool,
    pub skipped: bool,
    pub message: Option<String>,
    pub artifacts: Vec<Artifact>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl StageResult {
    pub fn success(stage: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            stage: stage.into(),
            success: true,
            skipped: false,
            message: None,
            artifacts: Vec::new(),
            started_at: now,
            completed_at: now,
        }
    }

    pub fn failure(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Self::success(stage)
        }
    }

    pub fn skipped(stage: impl Into<String>) -> Self {
        Self {
            skipped: true,
            message: Some("Skipped".to_string()),
            ..Self::success(stage)
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_artifact(mut self, artifact: Artifact) -> Self {
        self.artifacts.push(artifact);
        self
    }

    pub fn started(mut self, at: DateTime<Utc>) -> Self {
        self.started_at = at;
        self
    }
}

/// A file produced by a stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub name: String,
    pub artifact_type: ArtifactType,
    pub path: PathBuf,
    pub bytes: u64,
}

impl Artifact {
    pub fn new(name: impl Into<String>, artifact_type: ArtifactType, path: PathBuf) -> Self {
        Self {
            name: name.into(),
            artifact_type,
            path,
            bytes: 0,
        }
    }

    pub fn with_size(mut self, bytes: u64) -> Self {
        self.bytes = bytes;
        self
    }
}

/// Types of artifacts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactType {
    Report,
    Structured,
    Text,
}

impl ArtifactType {
    /// Guess the artifact type from a file extension.
    pub fn from_path(path: &std::path::Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("md") | Some("markdown") | Some("html") => Self::Report,
            Some("json") | Some("yaml") | Some("yml") => Self::Structured,
            _ => Self::Text,
        }
    }
}

/// Trait for stage implementations.
///
/// Stages must be `Send + Sync`; the executor holds them behind `Arc`.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Unique stage name, used for registry lookup and as the output key.
    fn name(&self) -> &str;

    /// Human-readable description of the stage.
    fn description(&self) -> &str;

    /// Declare the inputs this stage requires.
    fn input(&self) -> StageInput;

    /// Declare the outputs this stage produces.
    fn output(&self) -> StageOutput;

    /// Execute the stage.
    ///
    /// The context is mutable so the stage can record its output for the
    /// stages that follow.
    async fn execute(&self, context: &mut PipelineContext) -> CoreResult<StageResult>;

    /// Check if the stage should run given the context.
    ///
    /// Default: always run.
    fn should_run(&self, _context: &PipelineContext) -> bool {
        true
    }
}
