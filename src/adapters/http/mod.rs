//! HTTP adapters - REST API implementations.

pub mod explain;
mod router;

pub use explain::{explain_router, ExplainAppState};
pub use router::{build_router, cors_layer};
