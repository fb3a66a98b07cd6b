//! Ranker - Dense ranking of scored scenarios.

use std::cmp::Ordering;

use super::ScenarioResult;

/// Ranking functions over scored scenarios.
pub struct Ranker;

impl Ranker {
    /// Sorts results best-first and assigns ranks `1..=N`.
    ///
    /// # Algorithm
    /// Sort by `weighted_score` descending, ties broken by ascending
    /// scenario id. `rank = position + 1`.
    ///
    /// # Edge Cases
    /// - Empty input: Returns an empty vector
    /// - Equal scores: The lower scenario id ranks higher
    pub fn rank(mut results: Vec<ScenarioResult>) -> Vec<ScenarioResult> {
        results.sort_by(Self::compare);
        for (position, result) in results.iter_mut().enumerate() {
            result.rank = position as u32 + 1;
        }
        results
    }

    /// Re-sorts ranked results by scenario id without touching their ranks.
    pub fn by_scenario_order(mut results: Vec<ScenarioResult>) -> Vec<ScenarioResult> {
        results.sort_by_key(|r| r.scenario_id());
        results
    }

    /// Returns the result ranked first, if any.
    pub fn top_recommendation(results: &[ScenarioResult]) -> Option<&ScenarioResult> {
        results.iter().find(|r| r.rank == 1)
    }

    fn compare(a: &ScenarioResult, b: &ScenarioResult) -> Ordering {
        b.weighted_score
            .total_cmp(&a.weighted_score)
            .then_with(|| a.scenario_id().cmp(&b.scenario_id()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::Scenario;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn result(id: u32, score: f64) -> ScenarioResult {
        ScenarioResult {
            scenario: Scenario::new(id, format!("S{}", id), "", Vec::new()),
            weighted_score: score,
            rank: 0,
            contribution_by_attr: BTreeMap::new(),
        }
    }

    fn ids(results: &[ScenarioResult]) -> Vec<u32> {
        results.iter().map(|r| r.scenario_id()).collect()
    }

    #[test]
    fn rank_orders_by_score_descending() {
        let ranked = Ranker::rank(vec![result(1, 40.0), result(2, 72.5), result(3, 55.0)]);

        assert_eq!(ids(&ranked), vec![2, 3, 1]);
        assert_eq!(ranked.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn rank_breaks_ties_by_lower_id() {
        let ranked = Ranker::rank(vec![result(5, 61.0), result(2, 61.0), result(9, 30.0)]);

        assert_eq!(ids(&ranked), vec![2, 5, 9]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].rank, 2);
    }

    #[test]
    fn rank_empty_is_empty() {
        assert!(Ranker::rank(Vec::new()).is_empty());
    }

    #[test]
    fn by_scenario_order_keeps_ranks() {
        let ranked = Ranker::rank(vec![result(1, 10.0), result(2, 90.0)]);
        let reordered = Ranker::by_scenario_order(ranked);

        assert_eq!(ids(&reordered), vec![1, 2]);
        assert_eq!(reordered[0].rank, 2);
        assert_eq!(reordered[1].rank, 1);
    }

    #[test]
    fn top_recommendation_is_rank_one() {
        let ranked = Ranker::by_scenario_order(Ranker::rank(vec![
            result(1, 10.0),
            result(2, 90.0),
            result(3, 50.0),
        ]));

        let top = Ranker::top_recommendation(&ranked).unwrap();
        assert_eq!(top.scenario_id(), 2);
    }

    #[test]
    fn top_recommendation_of_unranked_results_is_none() {
        assert!(Ranker::top_recommendation(&[result(1, 10.0)]).is_none());
    }

    proptest! {
        #[test]
        fn rank_is_a_permutation_with_non_increasing_scores(
            scores in proptest::collection::vec(0u16..1000, 0..20),
        ) {
            let results: Vec<_> = scores
                .iter()
                .enumerate()
                .map(|(i, &s)| result(i as u32 + 1, f64::from(s) / 10.0))
                .collect();

            let ranked = Ranker::rank(results);

            let mut ranks: Vec<u32> = ranked.iter().map(|r| r.rank).collect();
            ranks.sort_unstable();
            prop_assert_eq!(ranks, (1..=scores.len() as u32).collect::<Vec<_>>());
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].weighted_score >= pair[1].weighted_score);
                if pair[0].weighted_score == pair[1].weighted_score {
                    prop_assert!(pair[0].scenario_id() < pair[1].scenario_id());
                }
            }
        }
    }
}
