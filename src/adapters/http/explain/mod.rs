//! Explain HTTP adapter - the single `/api/explain` endpoint.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::{ExplainApiError, ExplainAppState};
pub use routes::explain_router;
