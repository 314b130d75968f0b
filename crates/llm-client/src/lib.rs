//! Language-model client used by the planner, the workers and the synthesizer.
//!
//! This crate provides:
//! - [`LlmRequest`], one system prompt + one user message
//! - the [`LlmClient`] trait every model call in the assistant goes through
//! - [`AnthropicClient`], the Messages API implementation over `reqwest`
//! - [`StaticLlmClient`], a canned-answer client for tests and offline demos

use async_trait::async_trait;
use thiserror::Error;

pub mod anthropic;

pub use anthropic::{AnthropicClient, AnthropicConfig};

/// Errors that can occur when calling a language model
#[derive(Error, Debug)]
pub enum LlmClientError {
    #[error("LLM client misconfigured: {0}")]
    Configuration(String),

    #[error("Request to model failed: {0}")]
    Transport(String),

    #[error("Model API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response from model API: {0}")]
    InvalidResponse(String),
}

/// A single-turn model call
#[derive(Debug, Clone, PartialEq)]
pub struct LlmRequest {
    pub system: String,
    pub user: String,
    /// Overrides the client's default model
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl LlmRequest {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            model: None,
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// "Prompt in, text out"
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: LlmRequest) -> Result<String, LlmClientError>;
}

/// Client that answers every request with the same text
#[derive(Debug, Clone)]
pub struct StaticLlmClient {
    response: String,
}

impl StaticLlmClient {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

#[async_trait]
impl LlmClient for StaticLlmClient {
    async fn complete(&self, _request: LlmRequest) -> Result<String, LlmClientError> {
        Ok(self.response.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_request_builder() {
        let request = LlmRequest::new("You plan.", "젤다 어때?")
            .with_model("claude-3-5-haiku-latest")
            .with_max_tokens(512)
            .with_temperature(0.0);

        assert_eq!(request.system, "You plan.");
        assert_eq!(request.model.as_deref(), Some("claude-3-5-haiku-latest"));
        assert_eq!(request.max_tokens, Some(512));
        assert_eq!(request.temperature, Some(0.0));
    }

    #[tokio::test]
    async fn test_static_client_as_trait_object() {
        let client: Arc<dyn LlmClient> = Arc::new(StaticLlmClient::new("hello"));
        let answer = client.complete(LlmRequest::new("", "anything")).await.unwrap();
        assert_eq!(answer, "hello");
    }
}
