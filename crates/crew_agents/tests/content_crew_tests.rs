//! Integration tests for the content crew, driven by a scripted LLM.

use std::collections::VecDeque;
use std::fs;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::tempdir;

use crew_agents::{
    AgentError, ContentCrew, CrewConfig, KEYWORDS_TASK, REPORT_FILE, REPORT_TASK, STORY_TASK,
    TASK_ORDER,
};
use crew_core::{CoreError, RunState};
use crew_llm::{CompletionRequest, LlmClient, LlmError, LlmResponse, LlmResult};
use crew_spec::{KeywordSpec, Tone, ValidationError};

/// Replies from a fixed script and remembers every request.
struct ScriptedLlm {
    replies: Mutex<VecDeque<LlmResult<String>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedLlm {
    fn new(replies: Vec<LlmResult<String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn ok(replies: &[&str]) -> Arc<Self> {
        Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, request: &CompletionRequest) -> LlmResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::InvalidResponse("script exhausted".to_string())))?;

        Ok(LlmResponse {
            content: reply,
            input_tokens: 10,
            output_tokens: 20,
            model: "scripted".to_string(),
        })
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

const KEYWORDS_REPLY: &str = r#"Here are the keywords:
```json
{
  "primary_keywords": ["AI", "ai", "  Rural Healthcare  ", "telemedicine"],
  "secondary_keywords": ["diagnostics", "Diagnostics", "clinics"],
  "audience": "rural clinic administrators",
  "tone": "Dramatic"
}
```"#;

const REPORT_REPLY: &str = "# Content Report\n\n## Brief\n...\n";

fn inputs() -> [(&'static str, &'static str); 3] {
    [
        ("topic", "The future of AI in rural healthcare"),
        ("manager_brief", ""),
        ("run_timestamp", "2025-03-01T10:15:00"),
    ]
}

fn happy_script() -> Arc<ScriptedLlm> {
    ScriptedLlm::ok(&[
        "Brief: focus on clinics",
        KEYWORDS_REPLY,
        "Once upon a time in a rural clinic...",
        "Score: 8/10",
        REPORT_REPLY,
    ])
}

fn root_agent_error(err: &CoreError) -> Option<&AgentError> {
    err.stage_error().and_then(|e| e.downcast_ref::<AgentError>())
}

#[tokio::test]
async fn test_full_run_writes_report() {
    let dir = tempdir().unwrap();
    let output_dir = dir.path().join("output");
    let llm = happy_script();

    let crew = ContentCrew::new(&CrewConfig::builtin().unwrap(), llm.clone(), &output_dir).unwrap();
    let log = crew.kickoff(inputs()).await.unwrap();

    assert_eq!(log.state, RunState::Completed);
    assert_eq!(log.results.len(), TASK_ORDER.len());
    assert!(log.results.iter().all(|r| r.success && !r.skipped));

    let report = fs::read_to_string(crew.report_path()).unwrap();
    assert_eq!(report, REPORT_REPLY);
    assert_eq!(crew.report_path(), output_dir.join(REPORT_FILE));
    assert_eq!(log.final_output().unwrap().stage, REPORT_TASK);

    let report_result = log.results.last().unwrap();
    assert_eq!(report_result.artifacts.len(), 1);
    assert_eq!(report_result.artifacts[0].path, output_dir.join(REPORT_FILE));

    assert_eq!(llm.requests().len(), 5);
}

#[tokio::test]
async fn test_keywords_are_normalized_and_passed_on() {
    let dir = tempdir().unwrap();
    let llm = happy_script();

    let crew = ContentCrew::new(&CrewConfig::builtin().unwrap(), llm.clone(), dir.path()).unwrap();
    let log = crew.kickoff(inputs()).await.unwrap();

    let spec: KeywordSpec = log
        .context
        .structured_output(KEYWORDS_TASK)
        .unwrap()
        .expect("keywords output");
    assert_eq!(spec.primary_keywords(), ["AI", "Rural Healthcare", "telemedicine"]);
    assert_eq!(spec.secondary_keywords(), ["diagnostics", "clinics"]);
    assert_eq!(spec.tone(), Tone::Informative);

    // The story writer sees the validated record, not the raw reply.
    let requests = llm.requests();
    let story_prompt = requests[2].last_user_message().unwrap();
    assert!(story_prompt.contains("## keywords_task"));
    assert!(story_prompt.contains("\"Rural Healthcare\""));
    assert!(story_prompt.contains("\"tone\": \"informative\""));
    assert!(!story_prompt.contains("Dramatic"));

    // Only the keyword task gets the JSON instructions.
    assert!(requests[1].last_user_message().unwrap().contains("single JSON object"));
    assert!(!story_prompt.contains("single JSON object"));
}

#[tokio::test]
async fn test_inputs_are_rendered_into_prompts() {
    let dir = tempdir().unwrap();
    let llm = happy_script();

    let crew = ContentCrew::new(&CrewConfig::builtin().unwrap(), llm.clone(), dir.path()).unwrap();
    crew.kickoff(inputs()).await.unwrap();

    let requests = llm.requests();
    let kickoff = requests[0].last_user_message().unwrap();
    assert!(kickoff.contains("The future of AI in rural healthcare"));
    assert!(kickoff.contains("2025-03-01T10:15:00"));
    assert!(!kickoff.contains("{topic}"));
    assert!(requests[0].system.as_deref().unwrap().starts_with("You are Content Brief Coordinator."));
}

#[tokio::test]
async fn test_invalid_keywords_abort_run() {
    let dir = tempdir().unwrap();
    let llm = ScriptedLlm::ok(&[
        "Brief",
        r#"{"primary_keywords": ["AI"], "audience": "ab", "tone": "casual"}"#,
        "never used",
    ]);

    let crew = ContentCrew::new(&CrewConfig::builtin().unwrap(), llm.clone(), dir.path()).unwrap();
    let (log, outcome) = crew.kickoff_logged(inputs()).await;

    let err = outcome.unwrap_err();
    assert!(matches!(err, CoreError::StageFailed { ref stage, .. } if stage == KEYWORDS_TASK));
    let validation = root_agent_error(&err).and_then(|e| e.validation());
    assert!(matches!(
        validation,
        Some(ValidationError::AudienceLengthOutOfRange { length: 2, .. })
    ));

    assert_eq!(log.state, RunState::Failed);
    assert_eq!(log.failed_stage(), Some(KEYWORDS_TASK));
    assert!(log.context.output(KEYWORDS_TASK).is_none());
    assert!(!crew.report_path().exists());
    assert_eq!(llm.requests().len(), 2);
}

#[tokio::test]
async fn test_empty_primary_keywords_abort_run() {
    let dir = tempdir().unwrap();
    let llm = ScriptedLlm::ok(&[
        "Brief",
        r#"{"primary_keywords": ["  ", ""], "audience": "nurses"}"#,
    ]);

    let crew = ContentCrew::new(&CrewConfig::builtin().unwrap(), llm, dir.path()).unwrap();
    let err = crew.kickoff(inputs()).await.unwrap_err();

    let validation = root_agent_error(&err).and_then(|e| e.validation()).cloned();
    assert_eq!(validation, Some(ValidationError::EmptyPrimaryKeywords));
}

#[tokio::test]
async fn test_malformed_keywords_abort_run() {
    let dir = tempdir().unwrap();
    let llm = ScriptedLlm::ok(&["Brief", "I could not decide on keywords."]);

    let crew = ContentCrew::new(&CrewConfig::builtin().unwrap(), llm, dir.path()).unwrap();
    let err = crew.kickoff(inputs()).await.unwrap_err();

    let agent_err = root_agent_error(&err).unwrap();
    assert!(matches!(agent_err, AgentError::Spec(_)));
    assert!(agent_err.validation().is_none());
}

#[tokio::test]
async fn test_llm_error_aborts_run() {
    let dir = tempdir().unwrap();
    let llm = ScriptedLlm::new(vec![
        Ok("Brief".to_string()),
        Ok(KEYWORDS_REPLY.to_string()),
        Err(LlmError::Api {
            provider: "gemini".to_string(),
            status: 429,
            body: "quota".to_string(),
        }),
    ]);

    let crew = ContentCrew::new(&CrewConfig::builtin().unwrap(), llm.clone(), dir.path()).unwrap();
    let (log, outcome) = crew.kickoff_logged(inputs()).await;

    let err = outcome.unwrap_err();
    assert!(matches!(root_agent_error(&err), Some(AgentError::Llm(LlmError::Api { status: 429, .. }))));
    assert_eq!(log.failed_stage(), Some(STORY_TASK));
    // No retry.
    assert_eq!(llm.requests().len(), 3);
}

#[tokio::test]
async fn test_missing_input_fails_before_calling_llm() {
    let dir = tempdir().unwrap();
    let llm = happy_script();

    let crew = ContentCrew::new(&CrewConfig::builtin().unwrap(), llm.clone(), dir.path()).unwrap();
    let err = crew
        .kickoff([("topic", "AI"), ("manager_brief", "")])
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::DependencyNotSatisfied { ref key, .. } if key == "run_timestamp"));
    assert!(llm.requests().is_empty());
}

#[tokio::test]
async fn test_crew_with_incomplete_config() {
    let mut config = CrewConfig::builtin().unwrap();
    config.tasks.remove(REPORT_TASK);

    let err = ContentCrew::new(&config, happy_script(), "output").unwrap_err();
    assert!(matches!(err, AgentError::TaskNotFound(ref name) if name == REPORT_TASK));
}

#[tokio::test]
async fn test_crew_wiring() {
    let crew = ContentCrew::new(&CrewConfig::builtin().unwrap(), happy_script(), "output").unwrap();

    assert_eq!(crew.pipeline().stage_names(), TASK_ORDER);
    let registry = crew.registry();
    assert_eq!(registry.len(), 5);

    let story = registry.get(STORY_TASK).unwrap();
    assert!(story.input().required_keys.contains(&KEYWORDS_TASK.to_string()));

    let report = registry.get(REPORT_TASK).unwrap();
    assert_eq!(report.output().produces_files.len(), 1);
}
