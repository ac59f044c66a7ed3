//! Stage registry for managing stage implementations.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::stage::Stage;

/// A registry of stage implementations, keyed by stage name.
#[derive(Default)]
pub struct StageRegistry {
    stages: HashMap<String, Arc<dyn Stage>>,
}

impl StageRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            stages: HashMap::new(),
        }
    }

    /// Register a stage under its `name()`, replacing any previous entry.
    pub fn register(&mut self, stage: Arc<dyn Stage>) {
        let name = stage.name().to_string();
        debug!("Registering stage: {}", name);
        self.stages.insert(name, stage);
    }

    /// Get a stage by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Stage>> {
        self.stages.get(name).cloned()
    }

    /// Get a stage by name, returning an error if not found.
    pub fn get_required(&self, name: &str) -> CoreResult<Arc<dyn Stage>> {
        self.get(name)
            .ok_or_else(|| CoreError::StageNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.stages.contains_key(name)
    }

    /// Get all registered stage names (unordered).
    pub fn names(&self) -> Vec<&str> {
        self.stages.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl std::fmt::Debug for StageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageRegistry")
            .field("stages", &self.stages.keys().collect::<Vec<_>>())
            .finish()
    }
}
