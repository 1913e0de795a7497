//! Axum router configuration for the explain endpoint.

use axum::{routing::get, Router};

use super::handlers::{explain, health, method_not_allowed, preflight, ExplainAppState};

/// Create the explain API router.
///
/// # Routes
///
/// - `GET /` - Health check
/// - `POST /` - Explain a passage
/// - `OPTIONS /` - Preflight
/// - anything else - 405 with a JSON body
///
/// Suitable for mounting at `/api/explain`.
pub fn explain_router() -> Router<ExplainAppState> {
    Router::new().route(
        "/",
        get(health)
            .post(explain)
            .options(preflight)
            .fallback(method_not_allowed),
    )
}

