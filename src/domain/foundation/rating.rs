//! Rating value object: how well a scenario performs on one attribute (0-100).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Scenario rating on a 0 (poor) to 100 (excellent) scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Lowest possible rating.
    pub const MIN: Self = Self(0);

    /// Highest possible rating.
    pub const MAX: Self = Self(100);

    /// Creates a new Rating, clamping to valid range.
    pub fn new(value: u8) -> Self {
        Self(value.min(100))
    }

    /// Creates a Rating, returning error if out of range.
    pub fn try_new(value: i64) -> Result<Self, ValidationError> {
        if !(0..=100).contains(&value) {
            return Err(ValidationError::out_of_range(
                "rating",
                0,
                100,
                value.clamp(i32::MIN as i64, i32::MAX as i64) as i32,
            ));
        }
        Ok(Self(value as u8))
    }

    /// Returns the numeric value.
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Returns the display band for this rating.
    pub fn label(&self) -> &'static str {
        match self.0 {
            90..=100 => "Excellent",
            75..=89 => "Good",
            60..=74 => "Above Average",
            50..=59 => "Average",
            40..=49 => "Below Average",
            _ => "Poor",
        }
    }
}

impl TryFrom<i64> for Rating {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<Rating> for u8 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

impl From<Rating> for f64 {
    fn from(value: Rating) -> Self {
        f64::from(value.0)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_try_new_accepts_bounds() {
        assert_eq!(Rating::try_new(0).unwrap(), Rating::MIN);
        assert_eq!(Rating::try_new(100).unwrap(), Rating::MAX);
        assert_eq!(Rating::try_new(55).unwrap().value(), 55);
    }

    #[test]
    fn rating_try_new_rejects_invalid_values() {
        assert!(Rating::try_new(-1).is_err());
        assert!(Rating::try_new(101).is_err());
        assert!(Rating::try_new(i64::MAX).is_err());
    }

    #[test]
    fn rating_label_follows_bands() {
        assert_eq!(Rating::try_new(95).unwrap().label(), "Excellent");
        assert_eq!(Rating::try_new(90).unwrap().label(), "Excellent");
        assert_eq!(Rating::try_new(75).unwrap().label(), "Good");
        assert_eq!(Rating::try_new(60).unwrap().label(), "Above Average");
        assert_eq!(Rating::try_new(50).unwrap().label(), "Average");
        assert_eq!(Rating::try_new(45).unwrap().label(), "Below Average");
        assert_eq!(Rating::try_new(39).unwrap().label(), "Poor");
    }

    #[test]
    fn rating_serializes_as_bare_integer() {
        let rating = Rating::try_new(85).unwrap();
        assert_eq!(serde_json::to_string(&rating).unwrap(), "85");
        let back: Rating = serde_json::from_str("85").unwrap();
        assert_eq!(back, rating);
    }

    #[test]
    fn rating_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<Rating>("250").is_err());
    }
}
