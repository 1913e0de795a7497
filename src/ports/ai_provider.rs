//! AI Provider Port - Interface for the language model that writes narratives.
//!
//! The explain flow asks a chat-completion model for a tagged reply and hands
//! the reply text to the narrative pipeline. This port keeps the handler
//! independent of any particular provider.
//!
//! # Example
//!
//! ```ignore
//! let request = CompletionRequest::new(RequestMetadata::new("trace-1"))
//!     .with_system_prompt("You are a grounded mentor.")
//!     .with_message(MessageRole::User, "Romans 8:28 ...")
//!     .with_max_tokens(600)
//!     .with_temperature(0.7);
//!
//! let response = provider.complete(request).await?;
//! println!("{}", response.content);
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for chat-completion providers.
///
/// Implementations translate between provider wire formats and these types.
/// `CompletionResponse::content` is always a single plain string; adapters
/// normalize any structured content before returning it.
#[async_trait]
pub trait AIProvider: Send + Sync {
    /// Generate a single, non-streaming completion.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError>;

    /// Provider name and default model.
    fn provider_info(&self) -> ProviderInfo;
}

/// Request for a completion.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Conversation messages.
    pub messages: Vec<Message>,
    /// System prompt to guide model behavior.
    pub system_prompt: Option<String>,
    /// Per-request model override; the provider default applies when absent.
    pub model: Option<String>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Request metadata for tracing.
    pub metadata: RequestMetadata,
}

impl CompletionRequest {
    pub fn new(metadata: RequestMetadata) -> Self {
        Self {
            messages: Vec::new(),
            system_prompt: None,
            model: None,
            max_tokens: None,
            temperature: None,
            metadata,
        }
    }

    pub fn with_message(mut self, role: MessageRole, content: impl Into<String>) -> Self {
        self.messages.push(Message::new(role, content));
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Overrides the model for this request only.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }
}

/// A message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Role of the message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// Request metadata for tracing.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// Trace ID correlating logs for one explain request.
    pub trace_id: String,
}

impl RequestMetadata {
    pub fn new(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
        }
    }
}

/// Response from a completion.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Generated text, already normalized to one string.
    pub content: String,
    /// Token usage as reported by the provider.
    pub usage: TokenUsage,
    /// Model that generated the response.
    pub model: String,
    /// Why the model stopped generating.
    pub finish_reason: FinishReason,
}

/// Token usage information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Reason the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural stop.
    Stop,
    /// Hit max_tokens.
    Length,
    /// Content was filtered for safety.
    ContentFilter,
}

impl FinishReason {
    /// Maps a provider finish reason string; unknown values count as a stop.
    pub fn from_provider(reason: Option<&str>) -> Self {
        match reason {
            Some("length") => FinishReason::Length,
            Some("content_filter") => FinishReason::ContentFilter,
            _ => FinishReason::Stop,
        }
    }
}

/// Provider information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g., "openai").
    pub name: String,
    /// Default model identifier.
    pub model: String,
}

impl ProviderInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// AI provider errors.
#[derive(Debug, thiserror::Error)]
pub enum AIError {
    /// Rate limited by provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until retry is allowed.
        retry_after_secs: u32,
    },

    /// Content was filtered for safety.
    #[error("content filtered: {reason}")]
    ContentFiltered { reason: String },

    /// Provider is unavailable.
    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    /// API key rejected.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse provider response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid request configuration.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u32 },
}

impl AIError {
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    pub fn content_filtered(reason: impl Into<String>) -> Self {
        Self::ContentFiltered {
            reason: reason.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Returns true if retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AIError::RateLimited { .. }
                | AIError::Unavailable { .. }
                | AIError::Network(_)
                | AIError::Timeout { .. }
        )
    }
}
