//! Language model service for the Analyst and Evaluator
//!
//! Provides integration with the Anthropic Messages API, including tool use
//! so the Analyst can query brand context mid-generation.

use crate::config::LlmSettings;
use crate::error::{BrandscopeError, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Conversation role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One block of message content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },
    /// Block types this client does not interpret
    #[serde(other)]
    Unsupported,
}

/// A conversation turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }

    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }

    pub fn tool_results(results: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::User,
            content: results,
        }
    }
}

/// Tool made available to the model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// How the model may use the offered tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolChoice {
    Auto,
    Any,
    /// Tools stay defined but the model must answer in text
    None,
}

/// Provider-neutral request
#[derive(Debug, Clone, Default)]
pub struct ModelRequest {
    pub system: Option<String>,
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDefinition>,
    pub tool_choice: Option<ToolChoice>,
}

/// Provider-neutral response
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelResponse {
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

impl ModelResponse {
    /// All text blocks joined with newlines
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Tool calls requested in this turn, as `(id, name, input)`
    pub fn tool_uses(&self) -> Vec<(&str, &str, &Value)> {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse { id, name, input } => {
                    Some((id.as_str(), name.as_str(), input))
                }
                _ => None,
            })
            .collect()
    }

    /// Whether this turn carries at least one tool call to answer
    pub fn wants_tools(&self) -> bool {
        self.content
            .iter()
            .any(|block| matches!(block, ContentBlock::ToolUse { .. }))
    }
}

/// A reasoning backend the agents can call
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model identifier, for logs
    fn name(&self) -> &str;

    /// Send one request and return the model's turn
    async fn send(&self, request: ModelRequest) -> Result<ModelResponse>;

    /// Single-turn completion returning the text content
    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        let response = self
            .send(ModelRequest {
                system: Some(system.to_string()),
                messages: vec![Message::user(prompt)],
                ..ModelRequest::default()
            })
            .await?;
        Ok(response.text())
    }
}

/// Anthropic API request body
#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "no_tools")]
    tools: &'a [ToolDefinition],
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
}

fn no_tools(tools: &&[ToolDefinition]) -> bool {
    tools.is_empty()
}

/// Anthropic Messages API client
pub struct LlmService {
    settings: LlmSettings,
    client: reqwest::Client,
}

impl LlmService {
    /// Create a new LLM service
    pub fn new(settings: LlmSettings) -> Result<Self> {
        if settings.api_key.is_empty() {
            return Err(BrandscopeError::Config(
                "ANTHROPIC_API_KEY not set".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &LlmSettings {
        &self.settings
    }

    fn endpoint(&self) -> String {
        format!("{}/messages", self.settings.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LanguageModel for LlmService {
    fn name(&self) -> &str {
        &self.settings.model
    }

    async fn send(&self, request: ModelRequest) -> Result<ModelResponse> {
        debug!(
            "Calling Anthropic API: {} messages, {} tools",
            request.messages.len(),
            request.tools.len()
        );

        let body = AnthropicRequest {
            model: &self.settings.model,
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            system: request.system.as_deref(),
            messages: &request.messages,
            tools: &request.tools,
            tool_choice: request.tool_choice.filter(|_| !request.tools.is_empty()),
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-api-key", &self.settings.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(BrandscopeError::RateLimitExceeded(
                "Anthropic rate limit exceeded".to_string(),
            ));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(BrandscopeError::LlmApi(format!(
                "API request failed with status {}: {}",
                status, error_text
            )));
        }

        let parsed: ModelResponse = response
            .json()
            .await
            .map_err(|e| BrandscopeError::LlmApi(format!("Failed to parse response: {}", e)))?;

        debug!(
            "Anthropic response: {} blocks, stop_reason={:?}",
            parsed.content.len(),
            parsed.stop_reason
        );
        Ok(parsed)
    }
}
