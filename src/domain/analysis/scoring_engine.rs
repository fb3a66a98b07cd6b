//! Scoring Engine - Weighted scenario scores and per-attribute contributions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::Percentage;

use super::{AnalysisError, Attribute, Scenario, Shape};

/// A scenario extended with its computed score and rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    #[serde(flatten)]
    pub scenario: Scenario,
    /// Sum of contributions, rounded to one decimal.
    pub weighted_score: f64,
    /// Dense rank, 1 is best. Zero until ranked.
    pub rank: u32,
    /// Contribution of each attribute by name, rounded to one decimal.
    pub contribution_by_attr: BTreeMap<String, f64>,
}

impl ScenarioResult {
    /// Returns the id of the scored scenario.
    pub fn scenario_id(&self) -> u32 {
        self.scenario.id
    }
}

/// Weighted-sum scoring functions.
pub struct ScoringEngine;

impl ScoringEngine {
    /// Scores every scenario against the active weights.
    ///
    /// # Algorithm
    /// For each attribute position k:
    /// `contribution_k = rating_k * weight_k / 100`.
    /// `weighted_score = round1(Σ contribution_k)`, summing the unrounded
    /// contributions. Each stored contribution is rounded on its own, so the
    /// displayed contributions may differ from the score by ±0.1.
    ///
    /// Results come back in scenario order with rank 0; see
    /// [`Ranker::rank`](super::Ranker::rank).
    ///
    /// # Errors
    /// - `ShapeMismatch` if the weight vector or any scenario's ratings do
    ///   not have one entry per attribute. Nothing is scored in that case.
    pub fn compute_results(
        attributes: &[Attribute],
        scenarios: &[Scenario],
        weights: &[Percentage],
    ) -> Result<Vec<ScenarioResult>, AnalysisError> {
        let expected = attributes.len();
        if weights.len() != expected {
            return Err(AnalysisError::shape_mismatch(
                Shape::WeightVector,
                expected,
                weights.len(),
            ));
        }
        if let Some(bad) = scenarios.iter().find(|s| s.ratings.len() != expected) {
            return Err(AnalysisError::shape_mismatch(
                Shape::ScenarioRatings(bad.id),
                expected,
                bad.ratings.len(),
            ));
        }

        let results = scenarios
            .iter()
            .map(|scenario| Self::score_scenario(attributes, scenario, weights))
            .collect();

        Ok(results)
    }

    fn score_scenario(
        attributes: &[Attribute],
        scenario: &Scenario,
        weights: &[Percentage],
    ) -> ScenarioResult {
        let mut total = 0.0;
        let mut contribution_by_attr = BTreeMap::new();

        for ((attribute, rating), weight) in attributes.iter().zip(&scenario.ratings).zip(weights) {
            let contribution = f64::from(*rating) * weight.as_fraction();
            total += contribution;
            contribution_by_attr.insert(attribute.name.clone(), round_to_tenth(contribution));
        }

        ScenarioResult {
            scenario: scenario.clone(),
            weighted_score: round_to_tenth(total),
            rank: 0,
            contribution_by_attr,
        }
    }
}

/// Rounds to one decimal place, halves away from zero.
pub(crate) fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
