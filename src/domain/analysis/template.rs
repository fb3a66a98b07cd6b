//! Default analysis template used for new records and missing fields on load.

use crate::domain::foundation::{Percentage, Rating};

use super::{Attribute, Scenario};

/// The starting attributes and scenarios of a new analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisTemplate {
    pub attributes: Vec<Attribute>,
    pub scenarios: Vec<Scenario>,
}

const ATTRIBUTES: [(&str, u8); 6] = [
    ("Contractor Diversification", 8),
    ("Interface & Coordination", 11),
    ("Market Resource Availability", 21),
    ("Schedule & Delivery Confidence", 30),
    ("Financial Certainty", 24),
    ("Stakeholder Impact", 6),
];

const SCENARIOS: [(&str, &str, [u8; 6]); 6] = [
    (
        "Maximum Diversification (Baseline)",
        "Renewal A, Renewal B, DJT, Regional Stands, ITR West (5 contractors total)",
        [85, 40, 55, 45, 50, 60],
    ),
    (
        "High-Interface Package Consolidation",
        "DJT + ITR West (highest integration requirement), Renewal A, Renewal B, Regional Stands (4 contractors total)",
        [75, 85, 75, 80, 75, 80],
    ),
    (
        "Limited Interface Package Consolidation",
        "DJT, ITR West + Regional Stands (limited integration requirement), Renewal A, Renewal B (4 contractors total)",
        [75, 60, 65, 60, 60, 65],
    ),
    (
        "Operational Grouping",
        "DJT + Regional Stands (operational coordination), ITR West, Renewal A, Renewal B (4 contractors total)",
        [75, 65, 70, 65, 65, 70],
    ),
    (
        "High Concentration",
        "DJT + ITR West + Regional Stands (all major new works), Renewal A, Renewal B (3 contractors total)",
        [60, 70, 60, 55, 50, 60],
    ),
    (
        "Maximum Concentration",
        "DJT + ITR West + Regional Stands + Renewal A (mega contractor), Renewal B (2 contractors total)",
        [35, 60, 45, 45, 35, 40],
    ),
];

/// Builds the default template: six attributes and six scenarios, ids from 1.
pub fn default_analysis_template() -> AnalysisTemplate {
    let attributes = ATTRIBUTES
        .iter()
        .enumerate()
        .map(|(i, (name, weight))| Attribute::new(i as u32 + 1, *name, Percentage::new(*weight)))
        .collect();

    let scenarios = SCENARIOS
        .iter()
        .enumerate()
        .map(|(i, (name, description, ratings))| {
            Scenario::new(
                i as u32 + 1,
                *name,
                *description,
                ratings.iter().map(|&r| Rating::new(r)).collect(),
            )
        })
        .collect();

    AnalysisTemplate {
        attributes,
        scenarios,
    }
}
