//! Domain layer containing business logic and domain types.
//!
//! - `narrative` - Reshapes raw model replies into the three display blocks

pub mod narrative;
