//! Attribute - A weighted decision criterion.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::foundation::{Percentage, ValidationError};

/// A decision criterion with its manual importance weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: u32,
    pub name: String,
    pub weight: Percentage,
}

impl Attribute {
    /// Creates a new attribute.
    pub fn new(id: u32, name: impl Into<String>, weight: Percentage) -> Self {
        Self {
            id,
            name: name.into(),
            weight,
        }
    }
}

/// Sums the manual weights of a set of attributes.
pub fn total_weight(attributes: &[Attribute]) -> u32 {
    attributes.iter().map(|a| u32::from(a.weight.value())).sum()
}

/// Checks that attribute ids and names are unique and names are non-empty.
pub fn validate_attributes(attributes: &[Attribute]) -> Result<(), ValidationError> {
    let mut ids = HashSet::new();
    let mut names = HashSet::new();
    for attribute in attributes {
        if attribute.name.trim().is_empty() {
            return Err(ValidationError::empty_field("attribute.name"));
        }
        if !ids.insert(attribute.id) {
            return Err(ValidationError::duplicate("attribute.id", attribute.id.to_string()));
        }
        if !names.insert(attribute.name.as_str()) {
            return Err(ValidationError::duplicate("attribute.name", attribute.name.clone()));
        }
    }
    Ok(())
}
