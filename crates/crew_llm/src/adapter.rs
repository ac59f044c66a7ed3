//! LLM adapter for chat completions.
//!
//! Supports Gemini, OpenAI and Anthropic, selected through the `MODEL`
//! environment variable (`<provider>/<model>`). Each call is a single
//! HTTP request; retrying is left to the caller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{LlmError, LlmResult};
use crate::provider::{LlmProvider, ModelSpec};
use crate::types::{CompletionRequest, LlmResponse, MessageRole};

const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Anything that can answer a completion request.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Complete a conversation.
    async fn complete(&self, request: &CompletionRequest) -> LlmResult<LlmResponse>;

    /// Model identifier used for logging.
    fn model(&self) -> &str;
}

/// LLM adapter that handles API calls
pub struct LlmAdapter {
    provider: LlmProvider,
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl LlmAdapter {
    /// Create a new LLM adapter with explicit configuration
    pub fn new(spec: ModelSpec, api_key: impl Into<String>) -> Self {
        Self {
            provider: spec.provider,
            api_key: api_key.into(),
            base_url: spec.provider.default_base_url().to_string(),
            model: spec.model,
            client: reqwest::Client::new(),
        }
    }

    /// Override the provider endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Create an LLM adapter from environment variables.
    ///
    /// Reads `MODEL`, the provider's API key variable (e.g. `GEMINI_API_KEY`)
    /// and the optional base URL override (e.g. `GEMINI_BASE_URL`).
    pub fn from_env() -> LlmResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> LlmResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let model = non_empty("MODEL").ok_or_else(|| LlmError::MissingEnv("MODEL".to_string()))?;
        let spec = ModelSpec::parse(&model)?;

        let key_env = spec.provider.api_key_env();
        let api_key = non_empty(key_env).ok_or_else(|| LlmError::MissingEnv(key_env.to_string()))?;

        let mut adapter = Self::new(spec, api_key);
        if let Some(base_url) = non_empty(adapter.provider.base_url_env()) {
            adapter = adapter.with_base_url(base_url);
        }
        Ok(adapter)
    }

    /// Get the current provider
    pub fn provider(&self) -> LlmProvider {
        self.provider
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json(&self, request: reqwest::RequestBuilder, body: &Value) -> LlmResult<Value> {
        let response = request
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                provider: self.provider.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }

    // Gemini generateContent
    async fn complete_gemini(&self, request: &CompletionRequest) -> LlmResult<LlmResponse> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = gemini_request_body(request);
        let builder = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key);

        let value = self.post_json(builder, &body).await?;
        parse_gemini_response(&value, &self.model)
    }

    // OpenAI chat completion
    async fn complete_openai(&self, request: &CompletionRequest) -> LlmResult<LlmResponse> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(OpenAIMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.extend(request.messages.iter().map(|m| OpenAIMessage {
            role: role_name(m.role).to_string(),
            content: m.content.clone(),
        }));

        let body = serde_json::to_value(OpenAIRequest {
            model: self.model.clone(),
            messages,
            max_completion_tokens: Some(request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)),
        })
        .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let builder = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key));

        let value = self.post_json(builder, &body).await?;
        parse_openai_response(value, &self.model)
    }

    // Anthropic messages
    async fn complete_anthropic(&self, request: &CompletionRequest) -> LlmResult<LlmResponse> {
        let url = format!("{}/v1/messages", self.base_url);

        let body = serde_json::to_value(AnthropicRequest {
            model: self.model.clone(),
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            system: request.system.clone(),
            messages: request
                .messages
                .iter()
                .map(|m| AnthropicMessage {
                    role: role_name(m.role).to_string(),
                    content: m.content.clone(),
                })
                .collect(),
        })
        .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let builder = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01");

        let value = self.post_json(builder, &body).await?;
        parse_anthropic_response(value, &self.model)
    }
}

#[async_trait]
impl LlmClient for LlmAdapter {
    async fn complete(&self, request: &CompletionRequest) -> LlmResult<LlmResponse> {
        debug!(
            "Sending {} message(s) to {}/{}",
            request.messages.len(),
            self.provider,
            self.model
        );
        match self.provider {
            LlmProvider::Gemini => self.complete_gemini(request).await,
            LlmProvider::OpenAI => self.complete_openai(request).await,
            LlmProvider::Anthropic => self.complete_anthropic(request).await,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Debug for LlmAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmAdapter")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

fn role_name(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
    }
}

/// Build the JSON body for Gemini's generateContent API.
pub fn gemini_request_body(request: &CompletionRequest) -> Value {
    let contents: Vec<Value> = request
        .messages
        .iter()
        .map(|m| {
            let role = match m.role {
                MessageRole::User => "user",
                MessageRole::Assistant => "model",
            };
            json!({ "role": role, "parts": [{ "text": m.content }] })
        })
        .collect();

    let mut body = json!({
        "contents": contents,
        "generationConfig": {
            "maxOutputTokens": request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
        }
    });

    if let Some(system) = &request.system {
        body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
    }

    body
}

/// Parse a generateContent response; text parts of the first candidate are joined.
pub fn parse_gemini_response(body: &Value, model: &str) -> LlmResult<LlmResponse> {
    let candidate = body
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .ok_or_else(|| LlmError::InvalidResponse("No candidates in Gemini response".to_string()))?;

    let content: String = candidate
        .pointer("/content/parts")
        .and_then(|p| p.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
                .collect()
        })
        .unwrap_or_default();

    if content.trim().is_empty() {
        let reason = candidate
            .get("finishReason")
            .and_then(|r| r.as_str())
            .unwrap_or("unknown");
        return Err(LlmError::InvalidResponse(format!(
            "Empty Gemini response (finishReason={})",
            reason
        )));
    }

    let usage = body.get("usageMetadata");
    let count = |field: &str| {
        usage
            .and_then(|u| u.get(field))
            .and_then(|v| v.as_u64())
            .unwrap_or(0)
    };

    Ok(LlmResponse {
        content,
        input_tokens: count("promptTokenCount"),
        output_tokens: count("candidatesTokenCount"),
        model: model.to_string(),
    })
}

fn parse_openai_response(body: Value, model: &str) -> LlmResult<LlmResponse> {
    let result: OpenAIResponse = serde_json::from_value(body)
        .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    let content = result
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| LlmError::InvalidResponse("No response from OpenAI".to_string()))?;

    let (input_tokens, output_tokens) = result
        .usage
        .map(|u| (u.prompt_tokens, u.completion_tokens))
        .unwrap_or((0, 0));

    Ok(LlmResponse {
        content,
        input_tokens,
        output_tokens,
        model: model.to_string(),
    })
}

fn parse_anthropic_response(body: Value, model: &str) -> LlmResult<LlmResponse> {
    let result: AnthropicResponse = serde_json::from_value(body)
        .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    let content: String = result
        .content
        .iter()
        .filter_map(|c| c.text.as_deref())
        .collect();
    if content.trim().is_empty() {
        return Err(LlmError::InvalidResponse("No response from Anthropic".to_string()));
    }

    let (input_tokens, output_tokens) = result
        .usage
        .map(|u| (u.input_tokens, u.output_tokens))
        .unwrap_or((0, 0));

    Ok(LlmResponse {
        content,
        input_tokens,
        output_tokens,
        model: model.to_string(),
    })
}

// OpenAI API types
#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

// Anthropic API types
#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u64,
    output_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct AnthropicContent {
    text: Option<String>,
}
