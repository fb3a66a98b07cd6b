//! Pairwise Matrix - Reciprocal importance judgments between attributes.
//!
//! `M[i][j]` holds how important attribute `i` is relative to attribute `j`.
//! Entries are restricted to a discrete ratio scale, and every write sets
//! both halves of the matrix so that `M[i][j] * M[j][i] == 1` always holds.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Tolerance used when mapping a stored float back onto the ratio scale.
const RATIO_TOLERANCE: f64 = 1e-6;

/// Entries closer than this to 1 count as "equal importance".
const NEAR_EQUAL_THRESHOLD: f64 = 0.1;

/// Relative importance of one attribute over another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Importance {
    MuchMore,
    More,
    SlightlyMore,
    Equal,
    SlightlyLess,
    Less,
    MuchLess,
}

impl Importance {
    /// Every value on the scale, most important first.
    pub const ALL: [Importance; 7] = [
        Importance::MuchMore,
        Importance::More,
        Importance::SlightlyMore,
        Importance::Equal,
        Importance::SlightlyLess,
        Importance::Less,
        Importance::MuchLess,
    ];

    /// Returns the numeric ratio for this judgment.
    pub fn ratio(&self) -> f64 {
        match self {
            Importance::MuchMore => 5.0,
            Importance::More => 3.0,
            Importance::SlightlyMore => 1.5,
            Importance::Equal => 1.0,
            Importance::SlightlyLess => 1.0 / 1.5,
            Importance::Less => 1.0 / 3.0,
            Importance::MuchLess => 1.0 / 5.0,
        }
    }

    /// Returns the judgment seen from the other attribute's side.
    pub fn reciprocal(&self) -> Self {
        match self {
            Importance::MuchMore => Importance::MuchLess,
            Importance::More => Importance::Less,
            Importance::SlightlyMore => Importance::SlightlyLess,
            Importance::Equal => Importance::Equal,
            Importance::SlightlyLess => Importance::SlightlyMore,
            Importance::Less => Importance::More,
            Importance::MuchLess => Importance::MuchMore,
        }
    }

    /// Maps a raw ratio onto the scale, if it is one of the scale values.
    pub fn from_ratio(ratio: f64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|candidate| (candidate.ratio() - ratio).abs() < RATIO_TOLERANCE)
    }

    /// Returns true for judgments that express (near) equal importance.
    pub fn is_near_equal(&self) -> bool {
        (self.ratio() - 1.0).abs() < NEAR_EQUAL_THRESHOLD
    }
}

impl Serialize for Importance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.ratio())
    }
}

impl<'de> Deserialize<'de> for Importance {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let ratio = f64::deserialize(deserializer)?;
        Importance::from_ratio(ratio).ok_or_else(|| {
            serde::de::Error::custom(format!("{} is not a valid importance ratio", ratio))
        })
    }
}

/// Position of the pairwise comparison slider.
///
/// Negative positions favour the left (row) attribute, positive positions
/// favour the right (column) attribute. There is no neutral position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i8")]
pub struct SliderPosition(i8);

impl SliderPosition {
    /// All valid slider positions, left to right.
    pub const POSITIONS: [i8; 6] = [-5, -3, -1, 1, 3, 5];

    /// Creates a slider position, rejecting anything off the track.
    pub fn try_new(value: i64) -> Result<Self, ValidationError> {
        match value {
            -5 | -3 | -1 | 1 | 3 | 5 => Ok(Self(value as i8)),
            _ => Err(ValidationError::out_of_range(
                "slider_position",
                -5,
                5,
                value.clamp(i32::MIN as i64, i32::MAX as i64) as i32,
            )),
        }
    }

    /// Returns the raw position.
    pub fn value(&self) -> i8 {
        self.0
    }

    /// Converts the slider position into the row attribute's importance.
    pub fn importance(&self) -> Importance {
        match self.0 {
            -5 => Importance::MuchMore,
            -3 => Importance::More,
            -1 => Importance::SlightlyMore,
            1 => Importance::SlightlyLess,
            3 => Importance::Less,
            _ => Importance::MuchLess,
        }
    }

    /// Returns the slider position that displays a judgment, if any.
    ///
    /// Equal importance has no slider position.
    pub fn from_importance(importance: Importance) -> Option<Self> {
        let value = match importance {
            Importance::MuchMore => -5,
            Importance::More => -3,
            Importance::SlightlyMore => -1,
            Importance::Equal => return None,
            Importance::SlightlyLess => 1,
            Importance::Less => 3,
            Importance::MuchLess => 5,
        };
        Some(Self(value))
    }
}

impl TryFrom<i64> for SliderPosition {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<SliderPosition> for i8 {
    fn from(value: SliderPosition) -> Self {
        value.0
    }
}

impl fmt::Display for SliderPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Square reciprocal comparison matrix indexed by attribute position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Importance>>", into = "Vec<Vec<Importance>>")]
pub struct PairwiseMatrix {
    entries: Vec<Vec<Importance>>,
}

impl PairwiseMatrix {
    /// Creates a matrix for `size` attributes with no judgments made yet.
    ///
    /// Every row attribute starts slightly more important than the
    /// attributes after it.
    pub fn new(size: usize) -> Self {
        let entries = (0..size)
            .map(|i| {
                (0..size)
                    .map(|j| match i.cmp(&j) {
                        std::cmp::Ordering::Equal => Importance::Equal,
                        std::cmp::Ordering::Less => Importance::SlightlyMore,
                        std::cmp::Ordering::Greater => Importance::SlightlyLess,
                    })
                    .collect()
            })
            .collect();
        Self { entries }
    }

    /// Creates a matrix where every attribute is equally important.
    pub fn uniform(size: usize) -> Self {
        Self {
            entries: vec![vec![Importance::Equal; size]; size],
        }
    }

    /// Number of attributes covered by the matrix.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// Returns the matrix rows.
    pub fn rows(&self) -> &[Vec<Importance>] {
        &self.entries
    }

    /// Gets the judgment of attribute `i` relative to attribute `j`.
    pub fn get(&self, i: usize, j: usize) -> Option<Importance> {
        self.entries.get(i).and_then(|row| row.get(j)).copied()
    }

    /// Gets the numeric ratio `M[i][j]`.
    pub fn ratio(&self, i: usize, j: usize) -> Option<f64> {
        self.get(i, j).map(|importance| importance.ratio())
    }

    /// Records a slider judgment between attributes `i` and `j`.
    ///
    /// A judgment of an attribute against itself is ignored.
    pub fn set_judgment(
        &mut self,
        i: usize,
        j: usize,
        slider: SliderPosition,
    ) -> Result<(), ValidationError> {
        self.set_ratio(i, j, slider.importance())
    }

    /// Records any value of the ratio scale between attributes `i` and `j`.
    ///
    /// A judgment of an attribute against itself is ignored.
    pub fn set_ratio(
        &mut self,
        i: usize,
        j: usize,
        importance: Importance,
    ) -> Result<(), ValidationError> {
        self.check_index("row", i)?;
        self.check_index("column", j)?;
        if i == j {
            return Ok(());
        }
        self.entries[i][j] = importance;
        self.entries[j][i] = importance.reciprocal();
        Ok(())
    }

    /// Returns the slider position showing the judgment of `i` over `j`.
    pub fn slider_position(&self, i: usize, j: usize) -> Option<SliderPosition> {
        if i == j {
            return None;
        }
        self.get(i, j).and_then(SliderPosition::from_importance)
    }

    /// Lists the attribute pairs that need a judgment, row-major with `i < j`.
    pub fn comparison_pairs(&self) -> Vec<(usize, usize)> {
        let n = self.size();
        (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .collect()
    }

    /// Replaces every off-diagonal equal-importance judgment with
    /// "slightly more important" for the row attribute.
    ///
    /// Returns the number of pairs that were changed.
    pub fn repair_equal_judgments(&mut self) -> usize {
        let mut repaired = 0;
        for (i, j) in self.comparison_pairs() {
            if self.entries[i][j].is_near_equal() {
                self.entries[i][j] = Importance::SlightlyMore;
                self.entries[j][i] = Importance::SlightlyLess;
                repaired += 1;
            }
        }
        repaired
    }

    /// Checks the diagonal and reciprocity invariants.
    pub fn is_reciprocal(&self) -> bool {
        let n = self.size();
        self.entries.iter().all(|row| row.len() == n)
            && (0..n).all(|i| {
                self.entries[i][i] == Importance::Equal
                    && (0..n).all(|j| self.entries[i][j].reciprocal() == self.entries[j][i])
            })
    }

    fn check_index(&self, field: &str, index: usize) -> Result<(), ValidationError> {
        if index >= self.size() {
            return Err(ValidationError::out_of_range(
                format!("pairwise_matrix.{}", field),
                0,
                self.size().saturating_sub(1) as i32,
                index.min(i32::MAX as usize) as i32,
            ));
        }
        Ok(())
    }
}

impl TryFrom<Vec<Vec<Importance>>> for PairwiseMatrix {
    type Error = ValidationError;

    fn try_from(entries: Vec<Vec<Importance>>) -> Result<Self, Self::Error> {
        let matrix = Self { entries };
        if !matrix.is_reciprocal() {
            return Err(ValidationError::invalid_format(
                "pairwise_matrix",
                "matrix must be square with a unit diagonal and reciprocal entries",
            ));
        }
        Ok(matrix)
    }
}

impl From<PairwiseMatrix> for Vec<Vec<Importance>> {
    fn from(matrix: PairwiseMatrix) -> Self {
        matrix.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn slider(value: i64) -> SliderPosition {
        SliderPosition::try_new(value).unwrap()
    }

    #[test]
    fn new_matrix_has_unit_diagonal_and_slight_preferences() {
        let matrix = PairwiseMatrix::new(3);
        assert_eq!(matrix.get(0, 0), Some(Importance::Equal));
        assert_eq!(matrix.get(0, 2), Some(Importance::SlightlyMore));
        assert_eq!(matrix.get(2, 0), Some(Importance::SlightlyLess));
        assert!(matrix.is_reciprocal());
    }

    #[test]
    fn slider_positions_map_to_ratio_table() {
        let expected = [
            (-5, 5.0),
            (-3, 3.0),
            (-1, 1.5),
            (1, 1.0 / 1.5),
            (3, 1.0 / 3.0),
            (5, 1.0 / 5.0),
        ];
        for (position, ratio) in expected {
            assert!((slider(position).importance().ratio() - ratio).abs() < 1e-12);
        }
    }

    #[test]
    fn slider_rejects_positions_off_the_track() {
        for invalid in [-6, -4, -2, 0, 2, 4, 6] {
            assert!(SliderPosition::try_new(invalid).is_err(), "{} accepted", invalid);
        }
    }

    #[test]
    fn off_track_slider_is_out_of_range() {
        assert_eq!(
            SliderPosition::try_new(2),
            Err(ValidationError::out_of_range("slider_position", -5, 5, 2))
        );
        assert!(matches!(
            SliderPosition::try_new(i64::MAX),
            Err(ValidationError::OutOfRange { actual: i32::MAX, .. })
        ));
    }

    #[test]
    fn set_judgment_writes_both_halves() {
        let mut matrix = PairwiseMatrix::new(3);
        matrix.set_judgment(0, 2, slider(3)).unwrap();

        assert_eq!(matrix.get(0, 2), Some(Importance::Less));
        assert_eq!(matrix.get(2, 0), Some(Importance::More));
        let product = matrix.ratio(0, 2).unwrap() * matrix.ratio(2, 0).unwrap();
        assert!((product - 1.0).abs() < 1e-12);
    }

    #[test]
    fn set_judgment_on_diagonal_is_a_no_op() {
        let mut matrix = PairwiseMatrix::new(2);
        matrix.set_judgment(1, 1, slider(-5)).unwrap();
        assert_eq!(matrix.get(1, 1), Some(Importance::Equal));
    }

    #[test]
    fn set_judgment_rejects_out_of_range_index() {
        let mut matrix = PairwiseMatrix::new(2);
        let result = matrix.set_judgment(0, 2, slider(1));
        assert!(matches!(result, Err(ValidationError::OutOfRange { .. })));
    }

    #[test]
    fn slider_position_inverts_judgment() {
        let mut matrix = PairwiseMatrix::new(2);
        matrix.set_judgment(0, 1, slider(-3)).unwrap();
        assert_eq!(matrix.slider_position(0, 1), Some(slider(-3)));
        assert_eq!(matrix.slider_position(1, 0), Some(slider(3)));

        matrix.set_ratio(0, 1, Importance::Equal).unwrap();
        assert_eq!(matrix.slider_position(0, 1), None);
    }

    #[test]
    fn comparison_pairs_are_row_major_upper_triangle() {
        let matrix = PairwiseMatrix::new(4);
        assert_eq!(
            matrix.comparison_pairs(),
            vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]
        );
        assert!(PairwiseMatrix::new(1).comparison_pairs().is_empty());
    }

    #[test]
    fn repair_replaces_equal_judgments_on_both_halves() {
        let mut matrix = PairwiseMatrix::uniform(3);
        let repaired = matrix.repair_equal_judgments();

        assert_eq!(repaired, 3);
        assert_eq!(matrix.get(0, 1), Some(Importance::SlightlyMore));
        assert_eq!(matrix.get(1, 0), Some(Importance::SlightlyLess));
        assert_eq!(matrix.get(1, 1), Some(Importance::Equal));
        assert!(matrix.is_reciprocal());
    }

    #[test]
    fn matrix_serializes_as_nested_number_arrays() {
        let mut matrix = PairwiseMatrix::new(2);
        matrix.set_judgment(0, 1, slider(-5)).unwrap();
        let json = serde_json::to_string(&matrix).unwrap();
        assert_eq!(json, "[[1.0,5.0],[0.2,1.0]]");
    }

    #[test]
    fn matrix_deserializes_float_approximations() {
        let json = "[[1, 0.6666666667], [1.5, 1]]";
        let matrix: PairwiseMatrix = serde_json::from_str(json).unwrap();
        assert_eq!(matrix.get(0, 1), Some(Importance::SlightlyLess));
    }

    #[test]
    fn matrix_deserialize_rejects_values_off_the_scale() {
        assert!(serde_json::from_str::<PairwiseMatrix>("[[1, 2], [0.5, 1]]").is_err());
    }

    #[test]
    fn matrix_deserialize_rejects_non_reciprocal_entries() {
        assert!(serde_json::from_str::<PairwiseMatrix>("[[1, 5], [5, 1]]").is_err());
        assert!(serde_json::from_str::<PairwiseMatrix>("[[1, 5]]").is_err());
    }

    proptest! {
        #[test]
        fn reciprocity_holds_after_any_judgments(
            size in 1usize..8,
            judgments in proptest::collection::vec(
                (0usize..8, 0usize..8, prop::sample::select(SliderPosition::POSITIONS.to_vec())),
                0..40,
            ),
        ) {
            let mut matrix = PairwiseMatrix::new(size);
            for (i, j, position) in judgments {
                let position = SliderPosition::try_new(i64::from(position)).unwrap();
                let _ = matrix.set_judgment(i, j, position);
            }

            prop_assert!(matrix.is_reciprocal());
            for i in 0..size {
                prop_assert_eq!(matrix.ratio(i, i), Some(1.0));
                for j in 0..size {
                    let product = matrix.ratio(i, j).unwrap() * matrix.ratio(j, i).unwrap();
                    prop_assert!((product - 1.0).abs() < 1e-12);
                }
            }
        }
    }
}
