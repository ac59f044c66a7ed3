//! Sequential pipeline executor.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::context::{PipelineContext, TaskOutput};
use crate::error::{CoreError, CoreResult};
use crate::registry::StageRegistry;
use crate::stage::StageResult;

/// Run state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Run has not started
    #[default]
    Pending,
    /// Run is in progress
    Running,
    /// All stages completed
    Completed,
    /// A stage failed and the run stopped
    Failed,
}

/// A stage entry in the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStage {
    /// Stage name (maps to registry)
    pub name: String,
}

impl PipelineStage {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl<S: Into<String>> From<S> for PipelineStage {
    fn from(name: S) -> Self {
        Self::new(name)
    }
}

/// A pipeline definition.
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Unique pipeline identifier
    pub id: String,
    /// Human-readable name
    pub name: String,
    pub description: Option<String>,
    /// Ordered list of stages to execute
    pub stages: Vec<PipelineStage>,
}

impl Pipeline {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            stages: Vec::new(),
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Append a stage.
    pub fn stage(mut self, stage: impl Into<PipelineStage>) -> Self {
        self.stages.push(stage.into());
        self
    }

    /// Append several stages.
    pub fn stages(mut self, stages: impl IntoIterator<Item = impl Into<PipelineStage>>) -> Self {
        for s in stages {
            self.stages.push(s.into());
        }
        self
    }

    pub fn stage_names(&self) -> Vec<String> {
        self.stages.iter().map(|s| s.name.clone()).collect()
    }
}

/// Record of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLog {
    pub pipeline_id: String,
    pub pipeline_name: String,
    pub state: RunState,
    /// Index of the current/last stage executed
    pub current_stage_index: usize,
    /// Ordered stage names
    pub stages: Vec<String>,
    /// Results in execution order
    pub results: Vec<StageResult>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Error message if failed
    pub error: Option<String>,
    /// Context as left by the last stage
    pub context: PipelineContext,
}

impl RunLog {
    pub fn new(
        pipeline_id: impl Into<String>,
        pipeline_name: impl Into<String>,
        stages: Vec<String>,
        context: PipelineContext,
    ) -> Self {
        Self {
            pipeline_id: pipeline_id.into(),
            pipeline_name: pipeline_name.into(),
            state: RunState::Pending,
            current_stage_index: 0,
            stages,
            results: Vec::new(),
            started_at: None,
            completed_at: None,
            error: None,
            context,
        }
    }

    /// Output of the last stage that produced one.
    pub fn final_output(&self) -> Option<&TaskOutput> {
        self.context.last_output()
    }

    /// Name of the stage the run failed at.
    pub fn failed_stage(&self) -> Option<&str> {
        if self.state == RunState::Failed {
            self.stages.get(self.current_stage_index).map(|s| s.as_str())
        } else {
            None
        }
    }

    /// Wall-clock duration, once the run has finished.
    pub fn duration(&self) -> Option<chrono::Duration> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    fn fail(&mut self, message: String) {
        self.state = RunState::Failed;
        self.error = Some(message);
        self.completed_at = Some(Utc::now());
    }
}

/// Runs pipelines stage by stage, stopping at the first failure.
pub struct PipelineExecutor {
    registry: Arc<StageRegistry>,
}

impl PipelineExecutor {
    pub fn new(registry: Arc<StageRegistry>) -> Self {
        Self { registry }
    }

    /// Execute a pipeline.
    ///
    /// On failure the error is returned; use [`execute_logged`](Self::execute_logged)
    /// to keep the partial run log as well.
    pub async fn execute(
        &self,
        pipeline: &Pipeline,
        context: PipelineContext,
    ) -> CoreResult<RunLog> {
        let (log, outcome) = self.execute_logged(pipeline, context).await;
        outcome.map(|_| log)
    }

    /// Execute a pipeline, always returning the run log alongside the outcome.
    pub async fn execute_logged(
        &self,
        pipeline: &Pipeline,
        context: PipelineContext,
    ) -> (RunLog, CoreResult<()>) {
        let mut log = RunLog::new(&pipeline.id, &pipeline.name, pipeline.stage_names(), context);
        let outcome = self.run(&mut log).await;
        (log, outcome)
    }

    async fn run(&self, log: &mut RunLog) -> CoreResult<()> {
        log.state = RunState::Running;
        log.started_at = Some(Utc::now());

        info!(
            "Starting pipeline: {} (run {})",
            log.pipeline_name, log.context.run_id
        );

        for i in 0..log.stages.len() {
            let stage_name = log.stages[i].clone();
            log.current_stage_index = i;

            let stage = match self.registry.get_required(&stage_name) {
                Ok(s) => s,
                Err(e) => {
                    error!("Stage '{}' not found in registry", stage_name);
                    log.fail(e.to_string());
                    return Err(e);
                }
            };

            if !stage.should_run(&log.context) {
                info!("Skipping stage [{}/{}]: {}", i + 1, log.stages.len(), stage_name);
                log.results.push(StageResult::skipped(&stage_name));
                continue;
            }

            if let Some(key) = stage
                .input()
                .required_keys
                .into_iter()
                .find(|key| !log.context.has_key(key))
            {
                let err = CoreError::DependencyNotSatisfied {
                    stage: stage_name.clone(),
                    key,
                };
                error!("{}", err);
                log.fail(err.to_string());
                return Err(err);
            }

            info!("Executing stage [{}/{}]: {}", i + 1, log.stages.len(), stage_name);
            debug!("{}", stage.description());

            let started_at = Utc::now();
            let result = match stage.execute(&mut log.context).await {
                Ok(result) => result.started(started_at),
                Err(e) => {
                    error!("Stage '{}' execution error: {}", stage_name, e);
                    log.results
                        .push(StageResult::failure(&stage_name, e.to_string()).started(started_at));
                    log.fail(e.to_string());
                    return Err(CoreError::StageFailed {
                        stage: stage_name,
                        source: Box::new(e),
                    });
                }
            };

            let success = result.success;
            let message = result.message.clone();
            log.results.push(result);

            if !success {
                let err_msg = message.unwrap_or_else(|| "Stage failed".to_string());
                error!("Stage '{}' failed: {}", stage_name, err_msg);
                log.fail(err_msg.clone());
                return Err(CoreError::StageExecutionFailed {
                    stage: stage_name,
                    message: err_msg,
                });
            }

            if log.context.output(&stage_name).is_none() {
                warn!("Stage '{}' completed without recording an output", stage_name);
            }
            info!("Stage '{}' completed", stage_name);
        }

        log.state = RunState::Completed;
        log.completed_at = Some(Utc::now());

        info!("Pipeline '{}' completed", log.pipeline_name);
        Ok(())
    }
}
