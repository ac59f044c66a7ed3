//! The content crew: five agents run in sequence.
//!
//! ```text
//! kickoff_task → keywords_task → story_task → evaluate_task → report_task
//! ```
//!
//! `keywords_task` must return a valid [`KeywordSpec`](crew_spec::KeywordSpec);
//! `report_task` writes its reply to `content_report.md` in the output
//! directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crew_core::{
    CoreResult, Pipeline, PipelineContext, PipelineExecutor, RunLog, StageRegistry,
};
use crew_llm::LlmClient;
use tracing::info;

use crate::config::CrewConfig;
use crate::error::AgentResult;
use crate::stage::{AgentStage, OutputSchema};

pub const KICKOFF_TASK: &str = "kickoff_task";
pub const KEYWORDS_TASK: &str = "keywords_task";
pub const STORY_TASK: &str = "story_task";
pub const EVALUATE_TASK: &str = "evaluate_task";
pub const REPORT_TASK: &str = "report_task";

/// Tasks in execution order.
pub const TASK_ORDER: [&str; 5] = [
    KICKOFF_TASK,
    KEYWORDS_TASK,
    STORY_TASK,
    EVALUATE_TASK,
    REPORT_TASK,
];

/// File written by the report task, relative to the output directory.
pub const REPORT_FILE: &str = "content_report.md";

/// Assembled crew ready to run.
pub struct ContentCrew {
    registry: Arc<StageRegistry>,
    pipeline: Pipeline,
    output_dir: PathBuf,
}

impl ContentCrew {
    pub fn new(
        config: &CrewConfig,
        llm: Arc<dyn LlmClient>,
        output_dir: impl Into<PathBuf>,
    ) -> AgentResult<Self> {
        let mut registry = StageRegistry::new();

        for task_name in TASK_ORDER {
            let task = config.task(task_name)?;
            let agent = config.agent(&task.agent)?;
            let mut stage =
                AgentStage::new(task_name, agent.clone(), task.clone(), Arc::clone(&llm));

            stage = match task_name {
                KEYWORDS_TASK => stage.with_output_schema(OutputSchema::KeywordSpec),
                STORY_TASK => stage.requires(KEYWORDS_TASK),
                REPORT_TASK => stage.with_output_file(REPORT_FILE),
                _ => stage,
            };
            registry.register(Arc::new(stage));
        }

        let pipeline = Pipeline::new("content", "Content crew")
            .with_description("Brief, keywords, story, evaluation and report")
            .stages(TASK_ORDER);

        Ok(Self {
            registry: Arc::new(registry),
            pipeline,
            output_dir: output_dir.into(),
        })
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn registry(&self) -> Arc<StageRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Where the final report lands.
    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(REPORT_FILE)
    }

    /// Run every task in order with the given template inputs.
    pub async fn kickoff<K, V>(&self, inputs: impl IntoIterator<Item = (K, V)>) -> CoreResult<RunLog>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let (log, outcome) = self.kickoff_logged(inputs).await;
        outcome.map(|_| log)
    }

    /// Like [`kickoff`](Self::kickoff), keeping the run log when a stage fails.
    pub async fn kickoff_logged<K, V>(
        &self,
        inputs: impl IntoIterator<Item = (K, V)>,
    ) -> (RunLog, CoreResult<()>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        let context = PipelineContext::new(&self.output_dir).with_inputs(inputs);
        info!(
            "Kicking off {} with inputs: {:?}",
            self.pipeline.name,
            context.inputs.keys().collect::<Vec<_>>()
        );

        let executor = PipelineExecutor::new(self.registry());
        executor.execute_logged(&self.pipeline, context).await
    }
}

impl std::fmt::Debug for ContentCrew {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentCrew")
            .field("pipeline", &self.pipeline.stage_names())
            .field("registry", &self.registry)
            .field("output_dir", &self.output_dir)
            .finish()
    }
}
