//! HTTP handlers for the explain endpoint.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::{
    ExplainPassageCommand, ExplainPassageError, ExplainPassageHandler, GenerationSettings,
};
use crate::domain::narrative::NarrativeFormatter;
use crate::ports::{AIError, AIProvider};

use super::dto::{ErrorResponse, ExplainRequest, ExplainResponse, HealthResponse};

/// Application state for the explain endpoint.
#[derive(Clone)]
pub struct ExplainAppState {
    /// Model that writes the raw narrative
    pub provider: Arc<dyn AIProvider>,
    /// Shared formatting pipeline
    pub formatter: Arc<NarrativeFormatter>,
    /// Sampling settings for every request
    pub settings: GenerationSettings,
}

impl ExplainAppState {
    pub fn new(provider: Arc<dyn AIProvider>, formatter: Arc<NarrativeFormatter>) -> Self {
        Self {
            provider,
            formatter,
            settings: GenerationSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn explain_handler(&self) -> ExplainPassageHandler {
        ExplainPassageHandler::new(self.provider.clone(), self.formatter.clone())
            .with_settings(self.settings)
    }
}

/// API error type that converts handler errors to HTTP responses.
#[derive(Debug)]
pub struct ExplainApiError(ExplainPassageError);

impl From<ExplainPassageError> for ExplainApiError {
    fn from(err: ExplainPassageError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ExplainApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.0 {
            ExplainPassageError::InvalidInput(msg) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::bad_request(msg.clone()))
            }
            ExplainPassageError::AIProvider(err) => {
                tracing::error!(error = %err, "Explain request failed upstream");
                (StatusCode::BAD_GATEWAY, ErrorResponse::upstream(upstream_message(err)))
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Provider errors are reported without echoing upstream bodies.
fn upstream_message(err: &AIError) -> String {
    match err {
        AIError::AuthenticationFailed => "AI provider rejected the API key".to_string(),
        AIError::RateLimited { retry_after_secs } => {
            format!("AI provider rate limited, retry after {}s", retry_after_secs)
        }
        AIError::Timeout { .. } => "AI provider timed out".to_string(),
        AIError::ContentFiltered { .. } => "AI provider withheld the reply".to_string(),
        _ => "AI provider error".to_string(),
    }
}

/// Health check.
///
/// GET /api/explain
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// Explain a passage.
///
/// POST /api/explain
pub async fn explain(
    State(state): State<ExplainAppState>,
    payload: Result<Json<ExplainRequest>, JsonRejection>,
) -> Result<Json<ExplainResponse>, Response> {
    let Json(req) = payload.map_err(|rejection| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(rejection.body_text())),
        )
            .into_response()
    })?;

    let cmd = ExplainPassageCommand {
        model: req.model,
        reference: req.reference,
        passage: req.verse,
    };

    let result = state
        .explain_handler()
        .handle(cmd)
        .await
        .map_err(|e| ExplainApiError::from(e).into_response())?;

    tracing::debug!(source = ?result.source, model = %result.model, "Explanation ready");

    Ok(Json(ExplainResponse {
        explanation: result.explanation,
    }))
}

/// Bare OPTIONS without CORS preflight headers.
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Any method other than GET, POST or OPTIONS.
pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse::method_not_allowed()),
    )
}
