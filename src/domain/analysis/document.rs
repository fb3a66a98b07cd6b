//! Stored document forms of an analysis record.
//!
//! Stores hand back raw JSON. [`AnalysisDocument`] is the lenient view of
//! that JSON: every field may be absent or `null` and falls back to the
//! default template, while a field of the wrong type is a malformed record.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::{AnalysisId, Timestamp};

use super::{
    default_analysis_template, validate_attributes, validate_scenarios, AnalysisError,
    AnalysisRecord, Attribute, PairwiseMatrix, Scenario, ScenarioResult, WeightSource,
};

/// A persisted analysis as read from a store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<AnalysisId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub attributes: Option<Vec<Attribute>>,
    pub scenarios: Option<Vec<Scenario>>,
    #[serde(alias = "matrix")]
    pub pairwise_matrix: Option<PairwiseMatrix>,
    pub weight_source: Option<WeightSource>,
    pub results: Option<Vec<ScenarioResult>>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

const UNTITLED: &str = "Untitled analysis";

impl AnalysisDocument {
    /// Parses a stored JSON value.
    ///
    /// # Errors
    /// - `MalformedRecord` if the value is not an object or a present field
    ///   has the wrong type
    pub fn from_value(value: Value) -> Result<Self, AnalysisError> {
        serde_json::from_value(value).map_err(|e| AnalysisError::malformed(e.to_string()))
    }

    /// Converts the document to JSON.
    pub fn to_value(&self) -> Result<Value, AnalysisError> {
        serde_json::to_value(self).map_err(|e| AnalysisError::malformed(e.to_string()))
    }

    /// Rebuilds the record stored under `id`, filling gaps from the template.
    ///
    /// Stored results are ignored; they are recomputed from the inputs.
    /// A manual weight source is rebuilt from the attributes' own weights.
    ///
    /// # Errors
    /// - `MalformedRecord` if attributes or scenarios fail validation, the
    ///   matrix does not cover every attribute, or derived weights have no
    ///   matrix to come from
    /// - `ShapeMismatch` if a scenario's ratings do not cover every attribute
    pub fn into_record(self, id: AnalysisId) -> Result<AnalysisRecord, AnalysisError> {
        let template = default_analysis_template();

        let attributes = self.attributes.unwrap_or(template.attributes);
        validate_attributes(&attributes).map_err(|e| AnalysisError::malformed(e.to_string()))?;

        let scenarios = self.scenarios.unwrap_or(template.scenarios);
        validate_scenarios(&scenarios).map_err(|e| AnalysisError::malformed(e.to_string()))?;

        if let Some(matrix) = &self.pairwise_matrix {
            if matrix.size() != attributes.len() {
                return Err(AnalysisError::malformed(format!(
                    "pairwise matrix is {}x{} but there are {} attributes",
                    matrix.size(),
                    matrix.size(),
                    attributes.len()
                )));
            }
        }

        let weight_source = match self.weight_source {
            Some(WeightSource::Derived(weights)) => {
                if self.pairwise_matrix.is_none() {
                    return Err(AnalysisError::malformed(
                        "derived weights stored without a pairwise matrix",
                    ));
                }
                WeightSource::Derived(weights)
            }
            Some(WeightSource::Manual(_)) | None => WeightSource::manual_from(&attributes),
        };

        let created_at = self.created_at.unwrap_or_default();
        let updated_at = self.updated_at.unwrap_or(created_at);
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| UNTITLED.to_string());

        AnalysisRecord::reconstitute(
            id,
            name,
            self.description,
            attributes,
            scenarios,
            self.pairwise_matrix,
            weight_source,
            created_at,
            updated_at,
        )
    }

    /// Builds a dashboard summary from the stored fields without recomputing.
    pub fn summary(&self, id: AnalysisId) -> AnalysisSummary {
        let top_recommendation = self
            .results
            .as_deref()
            .and_then(|results| results.iter().find(|r| r.rank == 1))
            .map(RecommendationSummary::from);

        AnalysisSummary {
            id,
            name: self.name.clone().unwrap_or_else(|| UNTITLED.to_string()),
            description: self.description.clone(),
            top_recommendation,
            updated_at: self.updated_at.or(self.created_at).unwrap_or_default(),
        }
    }
}

/// The fields written on every save, taken at one revision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSnapshot {
    #[serde(skip)]
    pub revision: u64,
    pub name: String,
    pub description: Option<String>,
    pub attributes: Vec<Attribute>,
    pub scenarios: Vec<Scenario>,
    pub pairwise_matrix: Option<PairwiseMatrix>,
    pub weight_source: WeightSource,
    pub results: Vec<ScenarioResult>,
    pub updated_at: Timestamp,
}

impl AnalysisSnapshot {
    /// Converts the snapshot to a JSON object.
    pub fn to_value(&self) -> Result<Value, AnalysisError> {
        serde_json::to_value(self).map_err(|e| AnalysisError::malformed(e.to_string()))
    }

    /// Overwrites the snapshot's fields in a stored document, keeping the rest.
    pub fn merge_into(&self, document: &mut Value) -> Result<(), AnalysisError> {
        let Value::Object(target) = document else {
            return Err(AnalysisError::malformed("stored analysis is not an object"));
        };
        if let Value::Object(fields) = self.to_value()? {
            target.extend(fields);
        }
        Ok(())
    }
}

/// Dashboard listing entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub id: AnalysisId,
    pub name: String,
    pub description: Option<String>,
    pub top_recommendation: Option<RecommendationSummary>,
    pub updated_at: Timestamp,
}

/// The scenario ranked first in an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSummary {
    pub scenario_id: u32,
    pub name: String,
    #[serde(rename = "weightedScore")]
    pub weighted_score: f64,
}

impl From<&ScenarioResult> for RecommendationSummary {
    fn from(result: &ScenarioResult) -> Self {
        Self {
            scenario_id: result.scenario_id(),
            name: result.scenario.name.clone(),
            weighted_score: result.weighted_score,
        }
    }
}
