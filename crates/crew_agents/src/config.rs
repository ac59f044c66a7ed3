//! Agent and task configuration.
//!
//! Agents and tasks are described in two YAML files, each a mapping keyed
//! by name:
//!
//! ```yaml
//! # agents.yaml
//! story_writer:
//!   role: Story Writer
//!   goal: Write about "{topic}"
//!   backstory: You are a feature writer.
//!
//! # tasks.yaml
//! story_task:
//!   description: Write a story about "{topic}".
//!   expected_output: The story in markdown.
//!   agent: story_writer
//! ```
//!
//! A default set ships inside the binary; [`CrewConfig::load`] reads an
//! override directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AgentError, AgentResult};

/// File name of the agent definitions.
pub const AGENTS_FILE: &str = "agents.yaml";
/// File name of the task definitions.
pub const TASKS_FILE: &str = "tasks.yaml";

const BUILTIN_AGENTS: &str = include_str!("../config/agents.yaml");
const BUILTIN_TASKS: &str = include_str!("../config/tasks.yaml");

/// Persona of an agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgentConfig {
    pub role: String,
    pub goal: String,
    pub backstory: String,
}

/// A unit of work assigned to an agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskConfig {
    pub description: String,
    pub expected_output: String,
    /// Name of the agent executing the task
    pub agent: String,
}

/// All agents and tasks of a crew.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CrewConfig {
    pub agents: BTreeMap<String, AgentConfig>,
    pub tasks: BTreeMap<String, TaskConfig>,
}

impl CrewConfig {
    /// The configuration embedded in the binary.
    pub fn builtin() -> AgentResult<Self> {
        Self::from_yaml(BUILTIN_AGENTS, BUILTIN_TASKS)
    }

    /// Load `agents.yaml` and `tasks.yaml` from a directory.
    pub fn load(dir: &Path) -> AgentResult<Self> {
        let read = |name: &str| {
            let path = dir.join(name);
            debug!("Reading crew configuration from {}", path.display());
            fs::read_to_string(&path).map_err(|source| AgentError::ConfigFile { path, source })
        };
        Self::from_yaml(&read(AGENTS_FILE)?, &read(TASKS_FILE)?)
    }

    /// Parse both documents and check that every task names a known agent.
    pub fn from_yaml(agents: &str, tasks: &str) -> AgentResult<Self> {
        let config = Self {
            agents: serde_yaml::from_str(agents)?,
            tasks: serde_yaml::from_str(tasks)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AgentResult<()> {
        for (name, task) in &self.tasks {
            if !self.agents.contains_key(&task.agent) {
                return Err(AgentError::UnknownAgent {
                    task: name.clone(),
                    agent: task.agent.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn agent(&self, name: &str) -> AgentResult<&AgentConfig> {
        self.agents
            .get(name)
            .ok_or_else(|| AgentError::AgentNotFound(name.to_string()))
    }

    pub fn task(&self, name: &str) -> AgentResult<&TaskConfig> {
        self.tasks
            .get(name)
            .ok_or_else(|| AgentError::TaskNotFound(name.to_string()))
    }
}
