//! OpenAI Provider - Implementation of AIProvider for the chat completions API.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAIConfig::new(api_key)
//!     .with_model("gpt-5-nano")
//!     .with_base_url("https://api.openai.com/v1");
//!
//! let provider = OpenAIProvider::new(config)?;
//! ```
//!
//! # Reply content
//!
//! The `message.content` field of a reply may be a plain string, an array of
//! content parts, or null. All three are normalized here into one trimmed
//! string, so callers never see the wire shape.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::AiConfig;
use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, ProviderInfo,
    TokenUsage,
};

/// Configuration for the OpenAI provider.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Default model, overridable per request.
    pub model: String,
    /// Base URL for the API (default: https://api.openai.com/v1).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retries on transient failures.
    pub max_retries: u32,
}

impl OpenAIConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gpt-5-nano".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(60),
            max_retries: 2,
        }
    }

    /// Builds the provider configuration from the `ai` config section.
    pub fn from_app_config(ai: &AiConfig) -> Self {
        Self::new(ai.openai_api_key.expose_secret().clone())
            .with_model(ai.model.clone())
            .with_base_url(ai.base_url.clone())
            .with_timeout(ai.timeout())
            .with_max_retries(ai.max_retries)
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL. A trailing slash is dropped.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum retry count.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI API provider implementation.
pub struct OpenAIProvider {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIProvider {
    /// Creates a new OpenAI provider with the given configuration.
    pub fn new(config: OpenAIConfig) -> Result<Self, AIError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AIError::InvalidRequest(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    /// Converts our request to OpenAI's format.
    fn to_openai_request(&self, request: &CompletionRequest) -> OpenAIRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);

        if let Some(ref prompt) = request.system_prompt {
            messages.push(OpenAIMessage {
                role: "system",
                content: prompt.clone(),
            });
        }

        messages.extend(request.messages.iter().map(|msg| OpenAIMessage {
            role: msg.role.as_str(),
            content: msg.content.clone(),
        }));

        OpenAIRequest {
            model: self.model_for(request).to_string(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }

    fn model_for<'a>(&'a self, request: &'a CompletionRequest) -> &'a str {
        request
            .model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(&self.config.model)
    }

    async fn send_request(&self, request: &CompletionRequest) -> Result<Response, AIError> {
        let openai_request = self.to_openai_request(request);

        self.client
            .post(self.completions_url())
            .bearer_auth(self.config.api_key())
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AIError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    AIError::network(format!("Connection failed: {}", e))
                } else {
                    AIError::network(e.to_string())
                }
            })
    }

    /// Maps non-success statuses to errors.
    async fn handle_response_status(response: Response) -> Result<Response, AIError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 | 403 => Err(AIError::AuthenticationFailed),
            429 => Err(AIError::rate_limited(Self::parse_retry_after(&error_body))),
            400 | 404 | 422 => Err(AIError::InvalidRequest(error_body)),
            500..=599 => Err(AIError::unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(AIError::network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }

    /// Parses "try again in Xs" out of a rate-limit body. Defaults to 30.
    fn parse_retry_after(error_body: &str) -> u32 {
        serde_json::from_str::<serde_json::Value>(error_body)
            .ok()
            .and_then(|parsed| {
                let msg = parsed.get("error")?.get("message")?.as_str()?.to_string();
                let rest = &msg[msg.find("try again in ")? + 13..];
                let end = rest
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(rest.len());
                rest[..end].parse::<u32>().ok()
            })
            .unwrap_or(30)
    }

    async fn parse_response(response: Response) -> Result<CompletionResponse, AIError> {
        let response = Self::handle_response_status(response).await?;

        let openai_response: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| AIError::parse(format!("Failed to parse response: {}", e)))?;

        openai_response.into_completion()
    }

    async fn attempt(&self, request: &CompletionRequest) -> Result<CompletionResponse, AIError> {
        let response = self.send_request(request).await?;
        Self::parse_response(response).await
    }
}

#[async_trait]
impl AIProvider for OpenAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let mut retry_count = 0;

        loop {
            match self.attempt(&request).await {
                Ok(completion) => {
                    tracing::debug!(
                        trace_id = %request.metadata.trace_id,
                        model = %completion.model,
                        total_tokens = completion.usage.total_tokens,
                        "Completion received"
                    );
                    return Ok(completion);
                }
                Err(err) if err.is_retryable() && retry_count < self.config.max_retries => {
                    // Exponential backoff: 1s, 2s, 4s, ...
                    let delay = Duration::from_secs(1 << retry_count);
                    tracing::warn!(
                        trace_id = %request.metadata.trace_id,
                        attempt = retry_count + 1,
                        delay_secs = delay.as_secs(),
                        error = %err,
                        "Retrying completion request"
                    );
                    sleep(delay).await;
                    retry_count += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("openai", &self.config.model)
    }
}

// ----- OpenAI API Types -----

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

impl OpenAIResponse {
    fn into_completion(self) -> Result<CompletionResponse, AIError> {
        // A reply without choices reads as empty content, like a null message.
        let (content, finish_reason) = match self.choices.into_iter().next() {
            Some(choice) => (
                choice.message.content,
                FinishReason::from_provider(choice.finish_reason.as_deref()),
            ),
            None => {
                tracing::warn!(model = %self.model, "Completion returned no choices");
                (None, FinishReason::Stop)
            }
        };

        if finish_reason == FinishReason::ContentFilter {
            return Err(AIError::content_filtered("Reply was withheld by the provider"));
        }

        let usage = self
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(CompletionResponse {
            content: normalize_content(content),
            usage,
            model: self.model,
            finish_reason,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIReplyMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIReplyMessage {
    #[serde(default)]
    content: Option<ReplyContent>,
}

/// Shapes the reply `content` field arrives in.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReplyContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(default)]
    text: Option<String>,
}

/// Flattens reply content into one trimmed string. Parts are concatenated in
/// order; parts without text and a null content contribute nothing.
fn normalize_content(content: Option<ReplyContent>) -> String {
    match content {
        None => String::new(),
        Some(ReplyContent::Text(text)) => text.trim().to_string(),
        Some(ReplyContent::Parts(parts)) => parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect::<String>()
            .trim()
            .to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
