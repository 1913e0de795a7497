//! AI provider configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// AI provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// OpenAI API key (required)
    #[serde(default = "default_api_key")]
    pub openai_api_key: Secret<String>,

    /// Default chat model, overridable per request
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries on retryable failures
    #[serde(default = "default_retries")]
    pub max_retries: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Completion token cap
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if an API key is configured
    pub fn has_api_key(&self) -> bool {
        !self.openai_api_key.expose_secret().trim().is_empty()
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_api_key() {
            return Err(ValidationError::MissingRequired(
                "VERSE_EXPLAIN__AI__OPENAI_API_KEY",
            ));
        }
        if self.model.trim().is_empty() {
            return Err(ValidationError::MissingRequired("VERSE_EXPLAIN__AI__MODEL"));
        }
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(ValidationError::InvalidBaseUrl);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::InvalidTemperature);
        }
        if self.max_tokens == 0 {
            return Err(ValidationError::InvalidMaxTokens);
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            openai_api_key: default_api_key(),
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_api_key() -> Secret<String> {
    Secret::new(String::new())
}

fn default_model() -> String {
    "gpt-5-nano".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_retries() -> u32 {
    2
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    600
}
