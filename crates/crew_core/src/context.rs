//! Pipeline context carrying run inputs and stage outputs.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};

/// Output recorded by a stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskOutput {
    /// Name of the stage that produced this output
    pub stage: String,
    /// Raw text as returned by the agent
    pub raw: String,
    /// Validated structured form, when the stage declares a schema
    pub structured: Option<serde_json::Value>,
}

impl TaskOutput {
    pub fn new(stage: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            raw: raw.into(),
            structured: None,
        }
    }

    pub fn with_structured(mut self, value: serde_json::Value) -> Self {
        self.structured = Some(value);
        self
    }
}

/// Pipeline context containing all execution parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineContext {
    /// Unique run ID
    pub run_id: Uuid,
    /// Directory that receives output files
    pub output_dir: PathBuf,
    /// Template inputs (topic, run timestamp, ...)
    pub inputs: HashMap<String, String>,
    /// Stage outputs in execution order
    pub outputs: Vec<TaskOutput>,
}

impl PipelineContext {
    /// Create a new context writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            output_dir: output_dir.into(),
            inputs: HashMap::new(),
            outputs: Vec::new(),
        }
    }

    /// Add a template input.
    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.inputs.insert(key.into(), value.into());
        self
    }

    /// Add several template inputs.
    pub fn with_inputs<K, V>(mut self, inputs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in inputs {
            self.inputs.insert(k.into(), v.into());
        }
        self
    }

    /// Get a template input.
    pub fn input(&self, key: &str) -> Option<&str> {
        self.inputs.get(key).map(|s| s.as_str())
    }

    /// Record a stage output, replacing an earlier output of the same stage.
    pub fn record_output(&mut self, output: TaskOutput) {
        self.outputs.retain(|o| o.stage != output.stage);
        self.outputs.push(output);
    }

    /// Get the output of a stage.
    pub fn output(&self, stage: &str) -> Option<&TaskOutput> {
        self.outputs.iter().find(|o| o.stage == stage)
    }

    /// Deserialize the structured output of a stage.
    ///
    /// `Ok(None)` when the stage has not run or recorded no structured form.
    pub fn structured_output<T: serde::de::DeserializeOwned>(
        &self,
        stage: &str,
    ) -> CoreResult<Option<T>> {
        let Some(value) = self.output(stage).and_then(|o| o.structured.clone()) else {
            return Ok(None);
        };
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| CoreError::Serialization {
                stage: stage.to_string(),
                message: e.to_string(),
            })
    }

    /// The most recent output.
    pub fn last_output(&self) -> Option<&TaskOutput> {
        self.outputs.last()
    }

    /// Check whether a key is available as an input or a stage output.
    pub fn has_key(&self, key: &str) -> bool {
        self.inputs.contains_key(key) || self.output(key).is_some()
    }
}
