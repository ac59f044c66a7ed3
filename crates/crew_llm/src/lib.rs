//! # crew_llm
//!
//! Chat completion access for storycrew agents.
//!
//! The pipeline only needs one operation: send a system prompt and a
//! conversation, get text back. [`LlmClient`] is that seam; [`LlmAdapter`]
//! implements it over HTTP for Gemini, OpenAI and Anthropic.

pub mod adapter;
pub mod error;
pub mod provider;
pub mod types;

pub use adapter::{gemini_request_body, parse_gemini_response, LlmAdapter, LlmClient};
pub use error::{LlmError, LlmResult};
pub use provider::{LlmProvider, ModelSpec};
pub use types::{ChatMessage, CompletionRequest, LlmResponse, MessageRole};
