//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid host or socket address: {0}")]
    InvalidSocketAddr(String),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("AI base URL must start with http:// or https://")]
    InvalidBaseUrl,

    #[error("Temperature must be between 0.0 and 2.0")]
    InvalidTemperature,

    #[error("max_tokens must be greater than zero")]
    InvalidMaxTokens,

    #[error("Narrative length limit must be greater than zero")]
    InvalidLengthLimit,

    #[error("Invalid glyph palette: {0}")]
    InvalidGlyphPalette(#[from] crate::domain::narrative::PaletteError),
}
