//! Weight Source - Which weight vector currently drives scoring.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Percentage;

use super::Attribute;

/// The active weight vector and where it came from.
///
/// Derived weights take precedence over the attributes' manual weights
/// until a manual weight is edited again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "weights", rename_all = "snake_case")]
pub enum WeightSource {
    /// Weights typed in per attribute.
    Manual(Vec<Percentage>),
    /// Weights derived from the pairwise comparison matrix.
    Derived(Vec<Percentage>),
}

impl WeightSource {
    /// Builds a manual weight source from the attributes' own weights.
    pub fn manual_from(attributes: &[Attribute]) -> Self {
        WeightSource::Manual(attributes.iter().map(|a| a.weight).collect())
    }

    /// Returns the active weight vector.
    pub fn weights(&self) -> &[Percentage] {
        match self {
            WeightSource::Manual(weights) | WeightSource::Derived(weights) => weights,
        }
    }

    /// Returns true when pairwise weighting is active.
    pub fn is_derived(&self) -> bool {
        matches!(self, WeightSource::Derived(_))
    }
}
