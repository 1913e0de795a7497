//! Explain handlers.

mod explain_passage;

pub use explain_passage::{
    ExplainPassageCommand, ExplainPassageError, ExplainPassageHandler, ExplainPassageResult,
    GenerationSettings,
};
