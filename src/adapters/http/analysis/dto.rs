//! HTTP DTOs for analysis endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use serde::{Deserialize, Serialize};

use crate::application::SyncStatus;
use crate::domain::analysis::{
    AnalysisRecord, AnalysisSummary, PairwiseMatrix, RecommendationSummary, RecordState,
    ScenarioResult,
};
use crate::domain::foundation::ErrorCode;

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to create a new analysis.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAnalysisRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Request to rename an analysis.
#[derive(Debug, Clone, Deserialize)]
pub struct RenameAnalysisRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Request to change an attribute's manual weight.
#[derive(Debug, Clone, Deserialize)]
pub struct WeightRequest {
    pub weight: i64,
}

/// Request to rename an attribute.
#[derive(Debug, Clone, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

/// Request to change one rating of a scenario.
#[derive(Debug, Clone, Deserialize)]
pub struct RatingRequest {
    pub rating: i64,
}

/// Request to add a scenario.
#[derive(Debug, Clone, Deserialize)]
pub struct AddScenarioRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub ratings: Vec<i64>,
}

/// Request to set a pairwise judgment from a slider position.
#[derive(Debug, Clone, Deserialize)]
pub struct JudgmentRequest {
    pub i: usize,
    pub j: usize,
    pub slider: i64,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Full analysis view for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub attributes: Vec<AttributeResponse>,
    pub scenarios: Vec<ScenarioResponse>,
    pub weights: WeightsResponse,
    pub comparisons: Vec<ComparisonResponse>,
    pub results: Vec<ScenarioResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_recommendation: Option<RecommendationSummary>,
    pub sync: SyncResponse,
    pub created_at: String,
    pub updated_at: String,
}

impl AnalysisResponse {
    /// Builds the view of a record and the persistence status of its session.
    pub fn new(record: &AnalysisRecord, status: &SyncStatus) -> Self {
        Self {
            id: record.id().to_string(),
            name: record.name().to_string(),
            description: record.description().map(str::to_string),
            attributes: record
                .attributes()
                .iter()
                .map(|a| AttributeResponse {
                    id: a.id,
                    name: a.name.clone(),
                    weight: a.weight.value(),
                })
                .collect(),
            scenarios: record
                .scenarios()
                .iter()
                .map(|s| ScenarioResponse {
                    id: s.id,
                    name: s.name.clone(),
                    description: s.description.clone(),
                    ratings: s
                        .ratings
                        .iter()
                        .map(|r| RatingResponse {
                            value: r.value(),
                            label: r.label(),
                        })
                        .collect(),
                })
                .collect(),
            weights: WeightsResponse {
                source: if record.weight_source().is_derived() {
                    "derived"
                } else {
                    "manual"
                },
                active: record.active_weights().iter().map(|w| w.value()).collect(),
                total: record.weight_total(),
                balanced: record.is_weight_balanced(),
            },
            comparisons: comparisons(record),
            results: record.results().to_vec(),
            top_recommendation: record.top_recommendation().map(Into::into),
            sync: SyncResponse::new(status, record.revision()),
            created_at: record.created_at().as_datetime().to_rfc3339(),
            updated_at: record.updated_at().as_datetime().to_rfc3339(),
        }
    }
}

/// Lists every attribute pair with its current slider position.
///
/// Before the first judgment the pairs show the default matrix.
fn comparisons(record: &AnalysisRecord) -> Vec<ComparisonResponse> {
    let attributes = record.attributes();
    let matrix = record
        .pairwise_matrix()
        .cloned()
        .unwrap_or_else(|| PairwiseMatrix::new(attributes.len()));

    matrix
        .comparison_pairs()
        .into_iter()
        .map(|(i, j)| ComparisonResponse {
            i,
            j,
            left: attributes[i].name.clone(),
            right: attributes[j].name.clone(),
            slider: matrix.slider_position(i, j).map(|p| p.value()),
            ratio: matrix.ratio(i, j).unwrap_or(1.0),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct AttributeResponse {
    pub id: u32,
    pub name: String,
    pub weight: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResponse {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub ratings: Vec<RatingResponse>,
}

/// A rating with its display band.
#[derive(Debug, Clone, Serialize)]
pub struct RatingResponse {
    pub value: u8,
    pub label: &'static str,
}

/// The weights the scores are computed with.
#[derive(Debug, Clone, Serialize)]
pub struct WeightsResponse {
    pub source: &'static str,
    pub active: Vec<u8>,
    /// Sum of the manual attribute weights.
    pub total: u32,
    pub balanced: bool,
}

/// One pairwise comparison, left attribute against right attribute.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResponse {
    pub i: usize,
    pub j: usize,
    pub left: String,
    pub right: String,
    /// None while the pair is judged equal.
    pub slider: Option<i8>,
    pub ratio: f64,
}

/// Persistence state of an open analysis.
#[derive(Debug, Clone, Serialize)]
pub struct SyncResponse {
    pub state: RecordState,
    pub revision: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_saved: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyncResponse {
    pub fn new(status: &SyncStatus, revision: u64) -> Self {
        Self {
            state: status.record_state(revision),
            revision,
            last_saved: status.last_saved,
            error: status.last_error.clone(),
        }
    }
}

/// Response to a weight edit, carrying the weight actually applied.
#[derive(Debug, Clone, Serialize)]
pub struct WeightChangeResponse {
    pub applied: u8,
    pub analysis: AnalysisResponse,
}

/// Response to adding a scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioCreatedResponse {
    pub scenario_id: u32,
    pub analysis: AnalysisResponse,
}

/// Dashboard entry for list responses.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSummaryResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_recommendation: Option<RecommendationSummary>,
    pub updated_at: String,
}

impl From<AnalysisSummary> for AnalysisSummaryResponse {
    fn from(summary: AnalysisSummary) -> Self {
        Self {
            id: summary.id.to_string(),
            name: summary.name,
            description: summary.description,
            top_recommendation: summary.top_recommendation,
            updated_at: summary.updated_at.as_datetime().to_rfc3339(),
        }
    }
}

/// List of analyses, most recently updated first.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisListResponse {
    pub items: Vec<AnalysisSummaryResponse>,
    pub total: usize,
}

impl From<Vec<AnalysisSummary>> for AnalysisListResponse {
    fn from(summaries: Vec<AnalysisSummary>) -> Self {
        Self {
            total: summaries.len(),
            items: summaries.into_iter().map(Into::into).collect(),
        }
    }
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}
