//! # crew_agents
//!
//! LLM-backed agents for storycrew.
//!
//! An agent is a persona (role, goal, backstory); a task is a piece of work
//! assigned to one agent. Both come from YAML ([`CrewConfig`]). Each task
//! becomes an [`AgentStage`] in the `crew_core` pipeline, and
//! [`ContentCrew`] wires the five content tasks together.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use crew_agents::{ContentCrew, CrewConfig};
//! use crew_llm::LlmAdapter;
//!
//! let llm = Arc::new(LlmAdapter::from_env()?);
//! let crew = ContentCrew::new(&CrewConfig::builtin()?, llm, "output")?;
//! let log = crew
//!     .kickoff([
//!         ("topic", "The future of AI in rural healthcare"),
//!         ("manager_brief", ""),
//!         ("run_timestamp", "2025-01-01T09:00:00"),
//!     ])
//!     .await?;
//! ```

pub mod config;
pub mod crew;
pub mod error;
pub mod prompt;
pub mod stage;

pub use config::{AgentConfig, CrewConfig, TaskConfig, AGENTS_FILE, TASKS_FILE};
pub use crew::{
    ContentCrew, EVALUATE_TASK, KEYWORDS_TASK, KICKOFF_TASK, REPORT_FILE, REPORT_TASK,
    STORY_TASK, TASK_ORDER,
};
pub use error::{AgentError, AgentResult};
pub use prompt::{placeholders, PromptRenderer};
pub use stage::{AgentStage, OutputSchema};
