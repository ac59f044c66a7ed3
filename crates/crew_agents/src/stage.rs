//! LLM-backed pipeline stage: one agent executing one task.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use crew_core::{
    Artifact, ArtifactType, CoreResult, PipelineContext, Stage, StageInput, StageOutput,
    StageResult, TaskOutput,
};
use crew_llm::{ChatMessage, CompletionRequest, LlmClient};
use crew_spec::{
    parse_keyword_spec, Tone, MAX_AUDIENCE_LEN, MAX_PRIMARY_KEYWORDS, MAX_SECONDARY_KEYWORDS,
    MIN_AUDIENCE_LEN,
};
use tracing::{debug, info};

use crate::config::{AgentConfig, TaskConfig};
use crate::error::{AgentError, AgentResult};
use crate::prompt::{placeholders, PromptRenderer};

/// Structured record a task must return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSchema {
    KeywordSpec,
}

impl OutputSchema {
    /// Instruction appended to the task prompt describing the JSON shape.
    pub fn instructions(&self) -> String {
        match self {
            OutputSchema::KeywordSpec => {
                let tones: Vec<&str> = Tone::all().iter().map(|t| t.as_str()).collect();
                format!(
                    "Respond with a single JSON object and nothing else, with these fields:\n\
                     - \"primary_keywords\": array of 1 to {} strings\n\
                     - \"secondary_keywords\": array of 0 to {} strings\n\
                     - \"audience\": string of {} to {} characters\n\
                     - \"tone\": one of {}",
                    MAX_PRIMARY_KEYWORDS,
                    MAX_SECONDARY_KEYWORDS,
                    MIN_AUDIENCE_LEN,
                    MAX_AUDIENCE_LEN,
                    tones.join(", ")
                )
            }
        }
    }

    /// Parse and validate a raw reply into its JSON form.
    pub fn parse(&self, raw: &str) -> AgentResult<serde_json::Value> {
        match self {
            OutputSchema::KeywordSpec => {
                let spec = parse_keyword_spec(raw)?;
                Ok(serde_json::to_value(&spec).map_err(crew_spec::SpecError::from)?)
            }
        }
    }
}

/// A stage that asks an LLM agent to perform a task.
pub struct AgentStage {
    task_name: String,
    agent_name: String,
    agent: AgentConfig,
    task: TaskConfig,
    llm: Arc<dyn LlmClient>,
    requires: Vec<String>,
    output_schema: Option<OutputSchema>,
    output_file: Option<PathBuf>,
}

impl AgentStage {
    pub fn new(
        task_name: impl Into<String>,
        agent: AgentConfig,
        task: TaskConfig,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            task_name: task_name.into(),
            agent_name: task.agent.clone(),
            agent,
            task,
            llm,
            requires: Vec::new(),
            output_schema: None,
            output_file: None,
        }
    }

    /// Require an earlier stage's output (or an input) before running.
    pub fn requires(mut self, key: impl Into<String>) -> Self {
        self.requires.push(key.into());
        self
    }

    pub fn with_output_schema(mut self, schema: OutputSchema) -> Self {
        self.output_schema = Some(schema);
        self
    }

    /// Write the reply to this path, relative to the run's output directory.
    pub fn with_output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = Some(path.into());
        self
    }

    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    pub fn output_schema(&self) -> Option<OutputSchema> {
        self.output_schema
    }

    fn templates(&self) -> [&str; 5] {
        [
            self.agent.role.as_str(),
            self.agent.goal.as_str(),
            self.agent.backstory.as_str(),
            self.task.description.as_str(),
            self.task.expected_output.as_str(),
        ]
    }

    /// Build the completion request for the current context.
    pub fn build_request(&self, context: &PipelineContext) -> AgentResult<CompletionRequest> {
        let renderer = PromptRenderer::new(&context.inputs);

        let system = format!(
            "You are {}. {}\nYour personal goal is: {}",
            renderer.render(self.agent.role.trim())?,
            renderer.render(self.agent.backstory.trim())?,
            renderer.render(self.agent.goal.trim())?,
        );

        let mut prompt = format!(
            "Current task: {}\n\nExpected output: {}\n",
            renderer.render(self.task.description.trim())?,
            renderer.render(self.task.expected_output.trim())?,
        );

        if !context.outputs.is_empty() {
            prompt.push_str("\nContext from previous tasks:\n");
            for output in &context.outputs {
                prompt.push_str(&format!("\n## {}\n", output.stage));
                match &output.structured {
                    Some(value) => {
                        let json = serde_json::to_string_pretty(value)
                            .map_err(crew_spec::SpecError::from)?;
                        prompt.push_str(&format!("```json\n{}\n```\n", json));
                    }
                    None => {
                        prompt.push_str(output.raw.trim());
                        prompt.push('\n');
                    }
                }
            }
        }

        if let Some(schema) = self.output_schema {
            prompt.push('\n');
            prompt.push_str(&schema.instructions());
            prompt.push('\n');
        }

        Ok(CompletionRequest::new()
            .with_system(system)
            .with_message(ChatMessage::user(prompt)))
    }

    async fn run(&self, context: &mut PipelineContext) -> AgentResult<StageResult> {
        let request = self.build_request(context)?;
        debug!(
            "Prompt for {} ({}):\n{}",
            self.task_name,
            self.agent_name,
            request.last_user_message().unwrap_or_default()
        );

        let response = self.llm.complete(&request).await?;
        debug!("Raw reply from {}:\n{}", self.agent_name, response.content);

        let mut output = TaskOutput::new(&self.task_name, response.content.clone());
        if let Some(schema) = self.output_schema {
            let structured = schema.parse(&response.content)?;
            info!("{} produced a valid {:?}", self.task_name, schema);
            output = output.with_structured(structured);
        }

        let mut result = StageResult::success(&self.task_name).with_message(format!(
            "{} tokens in, {} tokens out",
            response.input_tokens, response.output_tokens
        ));

        if let Some(file) = &self.output_file {
            let path = context.output_dir.join(file);
            write_output(&path, &response.content).map_err(|source| AgentError::OutputFile {
                path: path.clone(),
                source,
            })?;
            info!("Wrote {}", path.display());

            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.task_name.clone());
            result = result.with_artifact(
                Artifact::new(name, ArtifactType::from_path(&path), path)
                    .with_size(response.content.len() as u64),
            );
        }

        context.record_output(output);
        Ok(result)
    }
}

fn write_output(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)
}

#[async_trait]
impl Stage for AgentStage {
    fn name(&self) -> &str {
        &self.task_name
    }

    fn description(&self) -> &str {
        self.task.description.trim()
    }

    fn input(&self) -> StageInput {
        let mut keys: Vec<String> = Vec::new();
        for template in self.templates() {
            for name in placeholders(template) {
                if !keys.contains(&name) {
                    keys.push(name);
                }
            }
        }
        for key in &self.requires {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
        keys.into_iter()
            .fold(StageInput::new(), |input, key| input.require_key(key))
    }

    fn output(&self) -> StageOutput {
        let output = StageOutput::new().produces_key(&self.task_name);
        match &self.output_file {
            Some(file) => output.produces_file(file),
            None => output,
        }
    }

    async fn execute(&self, context: &mut PipelineContext) -> CoreResult<StageResult> {
        info!("Agent '{}' working on {}", self.agent_name, self.task_name);
        Ok(self.run(context).await?)
    }
}

impl std::fmt::Debug for AgentStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentStage")
            .field("task", &self.task_name)
            .field("agent", &self.agent_name)
            .field("model", &self.llm.model())
            .field("output_schema", &self.output_schema)
            .field("output_file", &self.output_file)
            .finish()
    }
}
