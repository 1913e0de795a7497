//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port.
//!
//! - `OpenAIProvider` - OpenAI chat completions, with reply normalization
//! - `MockAIProvider` - Configurable mock for testing

mod mock_provider;
mod openai_provider;

pub use mock_provider::{MockAIProvider, MockError, MockResponse, DEFAULT_MOCK_REPLY};
pub use openai_provider::{OpenAIConfig, OpenAIProvider};
