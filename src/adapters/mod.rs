//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Chat-completion providers (OpenAI, mock)
//! - `http` - The axum REST surface

pub mod ai;
pub mod http;

pub use ai::{MockAIProvider, OpenAIConfig, OpenAIProvider};
pub use http::{build_router, ExplainAppState};
