//! Weight Deriver - Geometric-mean weighting of a pairwise comparison matrix.

use crate::domain::foundation::Percentage;

use super::PairwiseMatrix;

/// Converts pairwise judgments into whole-percent attribute weights.
pub struct WeightDeriver;

impl WeightDeriver {
    /// Derives attribute weights from the matrix.
    ///
    /// # Algorithm
    /// 1. Repair equal-importance judgments to "slightly more important"
    ///    (mutates the matrix).
    /// 2. `w_i = (Π_j M[i][j])^(1/n)` for every row.
    /// 3. `pct_i = round(100 * w_i / Σw)`.
    /// 4. Any rounding drift is added to the largest weight (first on ties),
    ///    so the result always sums to exactly 100.
    ///
    /// # Edge Cases
    /// - Empty matrix: Returns an empty vector
    /// - Single attribute: Returns `[100]`
    pub fn derive(matrix: &mut PairwiseMatrix) -> Vec<Percentage> {
        matrix.repair_equal_judgments();

        let means = Self::geometric_means(matrix);
        if means.is_empty() {
            return Vec::new();
        }

        let sum: f64 = means.iter().sum();
        let mut percents: Vec<i64> = means
            .iter()
            .map(|w| ((w / sum) * 100.0).round() as i64)
            .collect();

        let total: i64 = percents.iter().sum();
        if total != 100 {
            if let Some(index) = Self::first_max_index(&percents) {
                percents[index] += 100 - total;
            }
        }

        percents
            .into_iter()
            .map(|p| Percentage::new(p.clamp(0, 100) as u8))
            .collect()
    }

    /// Computes the geometric mean of every matrix row.
    pub fn geometric_means(matrix: &PairwiseMatrix) -> Vec<f64> {
        let n = matrix.size();
        matrix
            .rows()
            .iter()
            .map(|row| {
                let product: f64 = row.iter().map(|entry| entry.ratio()).product();
                product.powf(1.0 / n as f64)
            })
            .collect()
    }

    fn first_max_index(values: &[i64]) -> Option<usize> {
        let max = values.iter().max()?;
        values.iter().position(|v| v == max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::{Importance, SliderPosition};
    use proptest::prelude::*;

    fn values(weights: &[Percentage]) -> Vec<u8> {
        weights.iter().map(|w| w.value()).collect()
    }

    #[test]
    fn derive_empty_matrix_returns_empty_vector() {
        let mut matrix = PairwiseMatrix::new(0);
        assert!(WeightDeriver::derive(&mut matrix).is_empty());
    }

    #[test]
    fn derive_single_attribute_gets_everything() {
        let mut matrix = PairwiseMatrix::new(1);
        assert_eq!(values(&WeightDeriver::derive(&mut matrix)), vec![100]);
    }

    #[test]
    fn derive_two_attributes_much_more_important() {
        let mut matrix = PairwiseMatrix::new(2);
        matrix
            .set_judgment(0, 1, SliderPosition::try_new(-5).unwrap())
            .unwrap();

        assert_eq!(values(&WeightDeriver::derive(&mut matrix)), vec![83, 17]);
    }

    #[test]
    fn derive_repairs_exact_equality_before_weighting() {
        let mut matrix = PairwiseMatrix::new(2);
        matrix.set_ratio(0, 1, Importance::Equal).unwrap();

        let weights = WeightDeriver::derive(&mut matrix);

        assert_eq!(matrix.get(0, 1), Some(Importance::SlightlyMore));
        assert_eq!(matrix.get(1, 0), Some(Importance::SlightlyLess));
        assert!((matrix.ratio(0, 1).unwrap() - 1.5).abs() < 1e-12);
        assert!((matrix.ratio(1, 0).unwrap() - 1.0 / 1.5).abs() < 1e-12);
        // sqrt(1.5) : sqrt(1/1.5) = 60 : 40
        assert_eq!(values(&weights), vec![60, 40]);
    }

    #[test]
    fn derive_puts_rounding_drift_on_first_largest_weight() {
        // Three equally weighted rows round to 33 each; the missing point
        // goes to the first row.
        let mut matrix = PairwiseMatrix::new(3);
        matrix.set_ratio(0, 1, Importance::SlightlyMore).unwrap();
        matrix.set_ratio(1, 2, Importance::SlightlyMore).unwrap();
        matrix.set_ratio(0, 2, Importance::SlightlyLess).unwrap();

        let weights = values(&WeightDeriver::derive(&mut matrix));

        assert_eq!(weights, vec![34, 33, 33]);
        assert_eq!(weights.iter().map(|&w| u32::from(w)).sum::<u32>(), 100);
    }

    #[test]
    fn derive_default_matrix_favours_earlier_attributes() {
        let mut matrix = PairwiseMatrix::new(4);
        let weights = values(&WeightDeriver::derive(&mut matrix));
        assert!(weights.windows(2).all(|pair| pair[0] >= pair[1]));
        assert_eq!(weights.iter().map(|&w| u32::from(w)).sum::<u32>(), 100);
    }

    #[test]
    fn geometric_means_of_uniform_matrix_are_one() {
        let matrix = PairwiseMatrix::uniform(3);
        for mean in WeightDeriver::geometric_means(&matrix) {
            assert!((mean - 1.0).abs() < 1e-12);
        }
    }

    proptest! {
        #[test]
        fn derived_weights_always_sum_to_one_hundred(
            size in 1usize..10,
            judgments in proptest::collection::vec(
                (0usize..10, 0usize..10, 0usize..Importance::ALL.len()),
                0..60,
            ),
        ) {
            let mut matrix = PairwiseMatrix::new(size);
            for (i, j, k) in judgments {
                let _ = matrix.set_ratio(i, j, Importance::ALL[k]);
            }

            let weights = WeightDeriver::derive(&mut matrix);

            prop_assert_eq!(weights.len(), size);
            let total: u32 = weights.iter().map(|w| u32::from(w.value())).sum();
            prop_assert_eq!(total, 100);
            let repaired = matrix.rows().iter().enumerate().all(|(i, row)| {
                row.iter().enumerate().all(|(j, entry)| i == j || !entry.is_near_equal())
            });
            prop_assert!(repaired, "an equal judgment survived derivation");
        }
    }
}
