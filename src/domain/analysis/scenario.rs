//! Scenario - A candidate option rated against every attribute.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::foundation::{Rating, ValidationError};

/// A candidate option with one rating per attribute, aligned by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub ratings: Vec<Rating>,
}

impl Scenario {
    /// Creates a new scenario.
    pub fn new(
        id: u32,
        name: impl Into<String>,
        description: impl Into<String>,
        ratings: Vec<Rating>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            ratings,
        }
    }
}

/// Checks that scenario ids are unique and names are non-empty.
pub fn validate_scenarios(scenarios: &[Scenario]) -> Result<(), ValidationError> {
    let mut ids = HashSet::new();
    for scenario in scenarios {
        if scenario.name.trim().is_empty() {
            return Err(ValidationError::empty_field("scenario.name"));
        }
        if !ids.insert(scenario.id) {
            return Err(ValidationError::duplicate("scenario.id", scenario.id.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_description_defaults_to_empty() {
        let scenario: Scenario =
            serde_json::from_str(r#"{"id": 1, "name": "Baseline", "ratings": [10, 20]}"#).unwrap();
        assert_eq!(scenario.description, "");
        assert_eq!(scenario.ratings, vec![Rating::new(10), Rating::new(20)]);
    }

    #[test]
    fn scenario_rejects_ratings_out_of_range() {
        let json = r#"{"id": 1, "name": "Baseline", "ratings": [10, 200]}"#;
        assert!(serde_json::from_str::<Scenario>(json).is_err());
    }

    #[test]
    fn validate_rejects_duplicate_ids() {
        let scenarios = vec![
            Scenario::new(1, "A", "", vec![]),
            Scenario::new(1, "B", "", vec![]),
        ];
        assert!(matches!(
            validate_scenarios(&scenarios),
            Err(ValidationError::Duplicate { .. })
        ));
    }
}
