//! # crew_core
//!
//! Sequential pipeline engine for storycrew.
//!
//! # Architecture
//!
//! - **Stages**: Individual units of work (one agent executing one task)
//! - **Pipelines**: Ordered sequences of stage names
//! - **Registry**: Maps stage names to implementations
//! - **Executor**: Runs a pipeline stage by stage, threading a shared
//!   [`PipelineContext`] through and stopping at the first failure
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use crew_core::{Pipeline, PipelineContext, PipelineExecutor, StageRegistry};
//!
//! let mut registry = StageRegistry::new();
//! registry.register(Arc::new(MyStage));
//!
//! let executor = PipelineExecutor::new(Arc::new(registry));
//! let pipeline = Pipeline::new("content", "Content").stage("my-stage");
//!
//! let context = PipelineContext::new("output").with_input("topic", "Rural healthcare");
//! let log = executor.execute(&pipeline, context).await?;
//! println!("{}", log.final_output().map(|o| o.raw.as_str()).unwrap_or_default());
//! ```

pub mod context;
pub mod error;
pub mod executor;
pub mod registry;
pub mod stage;

pub use context::{PipelineContext, TaskOutput};
pub use error::{CoreError, CoreResult};
pub use executor::{Pipeline, PipelineExecutor, PipelineStage, RunLog, RunState};
pub use registry::StageRegistry;
pub use stage::{Artifact, ArtifactType, Stage, StageInput, StageOutput, StageResult};
