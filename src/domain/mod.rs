//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors, state machine)
//! - `analysis` - Weighting, scoring, ranking and the analysis record aggregate

pub mod analysis;
pub mod foundation;
