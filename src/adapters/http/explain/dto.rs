//! Request and response bodies for the explain endpoint.

use serde::{Deserialize, Serialize};

/// Route the explain API is mounted at.
pub const EXPLAIN_ROUTE: &str = "/api/explain";

/// POST /api/explain
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExplainRequest {
    /// Optional model override
    #[serde(default)]
    pub model: Option<String>,
    /// Citation, e.g. "Romans 8:28"
    #[serde(default)]
    pub reference: String,
    /// Passage text. Also accepted as `passage`.
    #[serde(default, alias = "passage")]
    pub verse: String,
}

/// Successful explain response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainResponse {
    pub explanation: String,
}

/// GET /api/explain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub route: String,
    pub runtime: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            ok: true,
            route: EXPLAIN_ROUTE.to_string(),
            runtime: "axum".to_string(),
        }
    }
}

/// Error body shared by every failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message
    pub error: String,
    /// Error code for programmatic handling
    pub code: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new("UPSTREAM_ERROR", message)
    }

    pub fn method_not_allowed() -> Self {
        Self::new("METHOD_NOT_ALLOWED", "Method not allowed")
    }

    pub fn timeout() -> Self {
        Self::new("TIMEOUT", "Request timed out")
    }
}
