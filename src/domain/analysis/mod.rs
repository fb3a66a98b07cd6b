//! Analysis Module - Multi-factor weighting, scoring and ranking.
//!
//! # Components
//!
//! - `PairwiseMatrix` / `WeightDeriver` - Reciprocal judgments and geometric-mean weights
//! - `ScoringEngine` - Weighted scores and per-attribute contributions
//! - `Ranker` - Dense ranking with ascending-id tie-break
//! - `AnalysisRecord` - Aggregate root; recomputes results on every mutation
//! - `AnalysisDocument` / `AnalysisSnapshot` - Stored and saved forms of a record
//!
//! The computation services are pure and stateless. Only the record holds
//! state, and persistence lives behind the `AnalysisStore` port.

mod attribute;
mod document;
mod errors;
mod pairwise_matrix;
mod ranker;
mod record;
mod record_state;
mod scenario;
mod scoring_engine;
mod template;
mod weight_deriver;
mod weight_source;

pub use attribute::{total_weight, validate_attributes, Attribute};
pub use document::{AnalysisDocument, AnalysisSnapshot, AnalysisSummary, RecommendationSummary};
pub use errors::{AnalysisError, Shape};
pub use pairwise_matrix::{Importance, PairwiseMatrix, SliderPosition};
pub use ranker::Ranker;
pub use record::AnalysisRecord;
pub use record_state::RecordState;
pub use scenario::{validate_scenarios, Scenario};
pub use scoring_engine::{ScenarioResult, ScoringEngine};
pub use template::{default_analysis_template, AnalysisTemplate};
pub use weight_deriver::WeightDeriver;
pub use weight_source::WeightSource;
