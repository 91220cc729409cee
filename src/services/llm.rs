//! LLM client for outfit generation and the styling assistant.
//!
//! Talks to any OpenAI-compatible chat-completions endpoint. The pipelines only see the
//! [`LanguageModel`] trait so they can run against a scripted model in tests.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::config::settings::AssistantConfig;

/// Failures talking to the LLM provider
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    /// Connection or protocol failure
    #[error("network error: {0}")]
    Transport(String),
    /// Request exceeded the configured timeout
    #[error("timeout")]
    Timeout,
    /// Non-success status not covered below
    #[error("http {status}: {body}")]
    Http {
        /// Status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },
    /// Provider-side rate limit
    #[error("rate limited")]
    RateLimited,
    /// Key rejected by the provider
    #[error("invalid api key")]
    InvalidApiKey,
    /// Reply could not be decoded
    #[error("json error: {0}")]
    Serde(String),
    /// Reply had no usable content
    #[error("empty response")]
    EmptyResponse,
}

/// One chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// `"system"`, `"user"` or `"assistant"`
    pub role: String,
    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// A system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// A user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A single completion request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Conversation to complete
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature
    pub temperature: f32,
    /// Reply token budget
    pub max_tokens: u32,
    /// Ask the provider for a JSON object reply
    pub json_mode: bool,
}

impl CompletionRequest {
    /// A system + user prompt pair
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::system(system), ChatMessage::user(prompt)],
            temperature: 0.8,
            max_tokens: 1200,
            json_mode: false,
        }
    }

    /// Requests JSON-mode output
    #[must_use]
    pub const fn json(mut self) -> Self {
        self.json_mode = true;
        self
    }

    /// Overrides sampling settings
    #[must_use]
    pub const fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// The user prompt (last user message), for logging and tests
    #[must_use]
    pub fn prompt(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map_or("", |m| m.content.as_str())
    }
}

/// Anything that can turn a prompt into text
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Returns the text of the first completion choice
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// OpenAI-compatible chat-completions client
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiClient {
    /// Create a new client with the given API key and assistant settings
    pub fn new(api_key: String, config: &AssistantConfig) -> Result<Self, LlmError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("wardrobe-buddy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let body = ChatCompletionBody {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request.json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let res = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        match res.status() {
            s if s.is_success() => {
                let parsed = res
                    .json::<ChatCompletionResponse>()
                    .await
                    .map_err(|e| LlmError::Serde(e.to_string()))?;
                parsed
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.message.content)
                    .filter(|content| !content.trim().is_empty())
                    .ok_or(LlmError::EmptyResponse)
            }
            StatusCode::UNAUTHORIZED => Err(LlmError::InvalidApiKey),
            StatusCode::TOO_MANY_REQUESTS => Err(LlmError::RateLimited),
            s => {
                let status = s.as_u16();
                let body = res.text().await.unwrap_or_default();
                Err(LlmError::Http { status, body })
            }
        }
    }
}

/// Sends a JSON-mode request and decodes the reply into `T`
pub async fn complete_json<T: DeserializeOwned>(
    model: &dyn LanguageModel,
    request: CompletionRequest,
) -> Result<T, LlmError> {
    let response = model.complete(request.json()).await?;
    let json_str = extract_json(&response);

    if json_str.is_empty() {
        return Err(LlmError::EmptyResponse);
    }

    serde_json::from_str(json_str).map_err(|e| {
        tracing::debug!(
            json_error = %e,
            preview = %json_str.chars().take(200).collect::<String>(),
            "Failed to parse JSON reply"
        );
        LlmError::Serde(e.to_string())
    })
}

fn map_reqwest_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::Transport(e.to_string())
    }
}

/// Extract JSON from a string that might contain markdown code blocks
fn extract_json(text: &str) -> &str {
    let text = text.trim();

    if let Some(start) = text.find("```json") {
        let content_start = start + 7;
        if let Some(end) = text[content_start..].find("```") {
            return text[content_start..content_start + end].trim();
        }
    }

    if let Some(start) = text.find("```") {
        let content_start = start + 3;
        // Skip past any language identifier on the same line
        let content_start = text[content_start..]
            .find('\n')
            .map_or(content_start, |i| content_start + i + 1);
        if let Some(end) = text[content_start..].find("```") {
            return text[content_start..content_start + end].trim();
        }
    }

    text
}
