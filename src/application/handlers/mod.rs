//! Application handlers.
//!
//! Command handlers that orchestrate domain operations through ports.

pub mod explain;

pub use explain::{
    ExplainPassageCommand, ExplainPassageError, ExplainPassageHandler, ExplainPassageResult,
    GenerationSettings,
};
