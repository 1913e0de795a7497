//! Mock AI Provider for testing.
//!
//! Lets handler and HTTP tests drive the explain flow without calling a real
//! model. Replies are queued up front and consumed in order; once the queue
//! is empty a fixed tagged reply is returned.
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::new()
//!     .with_response("::P1::Context.::/P1::")
//!     .with_error(MockError::Unavailable { message: "down".into() });
//!
//! let response = provider.complete(request).await?;
//! assert_eq!(response.content, "::P1::Context.::/P1::");
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, ProviderInfo,
    TokenUsage,
};

/// Reply returned once the queue runs dry.
pub const DEFAULT_MOCK_REPLY: &str =
    "::P1::A quiet word for a loud day.::/P1::\n::P2::You carry a lot.::BR2::It will feel lighter soon.::/P2::\n::P3::Take one slow breath before you answer.::/P3::";

/// Mock AI provider for testing.
#[derive(Debug, Clone)]
pub struct MockAIProvider {
    /// Pre-configured responses (consumed in order).
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    info: ProviderInfo,
    /// Simulated latency per request.
    delay: Duration,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Success {
        content: String,
        usage: TokenUsage,
        finish_reason: FinishReason,
    },
    Error(MockError),
}

/// Mock error types for testing error handling.
#[derive(Debug, Clone)]
pub enum MockError {
    RateLimited { retry_after_secs: u32 },
    ContentFiltered { reason: String },
    Unavailable { message: String },
    AuthenticationFailed,
    Network { message: String },
    Timeout { timeout_secs: u32 },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => AIError::rate_limited(retry_after_secs),
            MockError::ContentFiltered { reason } => AIError::content_filtered(reason),
            MockError::Unavailable { message } => AIError::unavailable(message),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Network { message } => AIError::network(message),
            MockError::Timeout { timeout_secs } => AIError::Timeout { timeout_secs },
        }
    }
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Locks a mutex, recovering the data if a panicking test poisoned it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockAIProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            info: ProviderInfo::new("mock", "mock-model-1"),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a successful response to the queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.with_response_full(content, TokenUsage::new(10, 20), FinishReason::Stop)
    }

    /// Adds a successful response with full configuration.
    pub fn with_response_full(
        self,
        content: impl Into<String>,
        usage: TokenUsage,
        finish_reason: FinishReason,
    ) -> Self {
        lock(&self.responses).push_back(MockResponse::Success {
            content: content.into(),
            usage,
            finish_reason,
        });
        self
    }

    /// Adds an error response to the queue.
    pub fn with_error(self, error: MockError) -> Self {
        lock(&self.responses).push_back(MockResponse::Error(error));
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_provider_info(mut self, info: ProviderInfo) -> Self {
        self.info = info;
        self
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        lock(&self.calls).clone()
    }

    /// The most recent request, if any.
    pub fn last_call(&self) -> Option<CompletionRequest> {
        lock(&self.calls).last().cloned()
    }

    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    fn next_response(&self) -> MockResponse {
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| MockResponse::Success {
                content: DEFAULT_MOCK_REPLY.to_string(),
                usage: TokenUsage::new(5, 10),
                finish_reason: FinishReason::Stop,
            })
    }
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        // Echo the override the way a real provider reports the model it ran.
        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.info.model.clone());
        lock(&self.calls).push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response() {
            MockResponse::Success {
                content,
                usage,
                finish_reason,
            } => Ok(CompletionResponse {
                content,
                usage,
                model,
                finish_reason,
            }),
            MockResponse::Error(err) => Err(err.into()),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}
