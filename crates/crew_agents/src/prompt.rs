//! `{name}` placeholder interpolation for agent and task text.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{AgentError, AgentResult};

static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
    })
}

/// Fills `{name}` placeholders from the run inputs.
///
/// Only identifier-shaped placeholders are touched, so literal JSON such as
/// `{"tone": "casual"}` passes through unchanged.
#[derive(Debug, Clone, Copy)]
pub struct PromptRenderer<'a> {
    inputs: &'a HashMap<String, String>,
}

impl<'a> PromptRenderer<'a> {
    pub fn new(inputs: &'a HashMap<String, String>) -> Self {
        Self { inputs }
    }

    /// Render a template. A placeholder without a value is an error.
    pub fn render(&self, template: &str) -> AgentResult<String> {
        let mut rendered = String::with_capacity(template.len());
        let mut last = 0;

        for caps in placeholder_regex().captures_iter(template) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let value = self
                .inputs
                .get(name.as_str())
                .ok_or_else(|| AgentError::MissingInput(name.as_str().to_string()))?;

            rendered.push_str(&template[last..whole.start()]);
            rendered.push_str(value);
            last = whole.end();
        }

        rendered.push_str(&template[last..]);
        Ok(rendered)
    }
}

/// Names of the placeholders in a template, in order of first appearance.
pub fn placeholders(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in placeholder_regex().captures_iter(template) {
        if let Some(name) = caps.get(1) {
            if !names.iter().any(|n| n == name.as_str()) {
                names.push(name.as_str().to_string());
            }
        }
    }
    names
}
