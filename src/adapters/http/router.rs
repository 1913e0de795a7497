//! Top-level router with the cross-cutting HTTP layers.

use axum::Router;
use http::{header, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

use super::explain::{explain_router, ExplainAppState, EXPLAIN_ROUTE};

/// Builds the application router.
///
/// Mounts the explain API and wraps it with request tracing, the request
/// timeout and CORS. Browsers call the endpoint cross-origin, so CORS sits
/// outermost and also answers preflights.
pub fn build_router(state: ExplainAppState, server: &ServerConfig) -> Router {
    Router::new()
        .nest(EXPLAIN_ROUTE, explain_router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(cors_layer(&server.cors_origins_list()))
}

/// CORS for `GET, POST, OPTIONS` with `Content-Type` and `Authorization`.
///
/// An empty origin list allows any origin. Origins that are not valid header
/// values are skipped with a warning.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(allowed))
}
