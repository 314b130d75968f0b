//! Anthropic Messages API client.

use crate::{LlmClient, LlmClientError, LlmRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

/// Default Anthropic API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1/messages";

/// Anthropic API version header value
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Connection settings and per-request defaults
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub base_url: String,
    pub default_model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl AnthropicConfig {
    pub fn new(api_key: impl Into<String>, default_model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: default_model.into(),
            max_tokens: 1024,
            temperature: 0.2,
            timeout: Duration::from_secs(60),
        }
    }
}

/// [`LlmClient`] over the Messages API
#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicClient {
    pub fn new(config: AnthropicConfig) -> Result<Self, LlmClientError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmClientError::Configuration(
                "Anthropic API key is empty".to_string(),
            ));
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                LlmClientError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self { client, config })
    }

    pub fn default_model(&self) -> &str {
        &self.config.default_model
    }

    fn body_for<'a>(&'a self, request: &'a LlmRequest) -> MessagesRequest<'a> {
        MessagesRequest {
            model: request
                .model
                .as_deref()
                .unwrap_or(&self.config.default_model),
            system: (!request.system.is_empty()).then_some(request.system.as_str()),
            messages: vec![Message {
                role: "user",
                content: &request.user,
            }],
            max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
            temperature: request.temperature.unwrap_or(self.config.temperature),
        }
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, request: LlmRequest) -> Result<String, LlmClientError> {
        let body = self.body_for(&request);
        debug!(
            model = body.model,
            max_tokens = body.max_tokens,
            temperature = body.temperature,
            "Invoking Anthropic Messages API"
        );

        let response = self
            .client
            .post(&self.config.base_url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmClientError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Anthropic API returned {}: {}", status, body);
            return Err(LlmClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = response.json().await.map_err(|e| {
            LlmClientError::InvalidResponse(format!("Failed to parse response: {}", e))
        })?;

        let text = parsed.text();
        if text.is_empty() {
            return Err(LlmClientError::InvalidResponse(
                "response carried no text content".to_string(),
            ));
        }
        Ok(text)
    }
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

impl MessagesResponse {
    /// Concatenation of every text block, other block types skipped
    fn text(&self) -> String {
        self.content
            .iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text.as_deref())
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}
