//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `VERSE_EXPLAIN` prefix and nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use verse_explain::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {:?}", config.server.socket_addr());
//! ```

mod ai;
mod error;
mod narrative;
mod server;

pub use ai::AiConfig;
pub use error::{ConfigError, ValidationError};
pub use narrative::NarrativeConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, CORS)
    #[serde(default)]
    pub server: ServerConfig,

    /// AI provider configuration (OpenAI)
    #[serde(default)]
    pub ai: AiConfig,

    /// Narrative formatting (length budget, connectors, glyphs)
    #[serde(default)]
    pub narrative: NarrativeConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `VERSE_EXPLAIN` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `VERSE_EXPLAIN__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `VERSE_EXPLAIN__AI__OPENAI_API_KEY=...` -> `ai.openai_api_key = ...`
    /// - `VERSE_EXPLAIN__NARRATIVE__GLYPH_PALETTE=✦,❀` -> `narrative.glyph_palette`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    /// A missing API key is reported by [`AppConfig::validate()`].
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("VERSE_EXPLAIN")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.narrative.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
