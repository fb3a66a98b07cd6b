//! Analysis record - The root entity of a multi-factor analysis.
//!
//! An AnalysisRecord owns attributes, scenarios, the optional pairwise
//! matrix and the active weight source. Results are derived from those
//! inputs after every mutation and never edited directly.

use crate::domain::foundation::{AnalysisId, Percentage, Rating, Timestamp, ValidationError};

use super::{
    default_analysis_template, total_weight, AnalysisDocument, AnalysisError, AnalysisSnapshot,
    AnalysisSummary, Attribute, Importance, PairwiseMatrix, Ranker, RecommendationSummary,
    Scenario, ScenarioResult, ScoringEngine, Shape, SliderPosition, WeightDeriver, WeightSource,
};

/// The AnalysisRecord aggregate root.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRecord {
    id: AnalysisId,
    name: String,
    description: Option<String>,
    attributes: Vec<Attribute>,
    scenarios: Vec<Scenario>,
    pairwise_matrix: Option<PairwiseMatrix>,
    weight_source: WeightSource,
    /// Ranked results, best first.
    results: Vec<ScenarioResult>,
    created_at: Timestamp,
    updated_at: Timestamp,
    /// Bumped by every successful mutation.
    revision: u64,
}

impl AnalysisRecord {
    /// Creates a new analysis seeded from the default template.
    ///
    /// # Errors
    /// - `Validation` if the name is blank
    pub fn create(
        name: impl Into<String>,
        description: Option<String>,
    ) -> Result<Self, AnalysisError> {
        let name = validate_name(name.into())?;
        let template = default_analysis_template();
        let now = Timestamp::now();

        let mut record = Self {
            id: AnalysisId::new(),
            name,
            description: normalize_description(description),
            weight_source: WeightSource::manual_from(&template.attributes),
            attributes: template.attributes,
            scenarios: template.scenarios,
            pairwise_matrix: None,
            results: Vec::new(),
            created_at: now,
            updated_at: now,
            revision: 0,
        };
        record.recompute()?;
        Ok(record)
    }

    /// Reconstitutes a record from persisted parts and recomputes its results.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: AnalysisId,
        name: String,
        description: Option<String>,
        attributes: Vec<Attribute>,
        scenarios: Vec<Scenario>,
        pairwise_matrix: Option<PairwiseMatrix>,
        weight_source: WeightSource,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Result<Self, AnalysisError> {
        let mut record = Self {
            id,
            name,
            description,
            attributes,
            scenarios,
            pairwise_matrix,
            weight_source,
            results: Vec::new(),
            created_at,
            updated_at,
            revision: 0,
        };
        record.recompute()?;
        Ok(record)
    }

    // ───────────────────────────────────────────────────────────────
    // Accessors
    // ───────────────────────────────────────────────────────────────

    pub fn id(&self) -> AnalysisId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Returns the pairwise matrix, if any judgment has been made.
    pub fn pairwise_matrix(&self) -> Option<&PairwiseMatrix> {
        self.pairwise_matrix.as_ref()
    }

    pub fn weight_source(&self) -> &WeightSource {
        &self.weight_source
    }

    /// Returns the results in rank order.
    pub fn results(&self) -> &[ScenarioResult] {
        &self.results
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Returns the edit revision. Starts at zero when created or loaded.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns the weight vector currently used for scoring.
    pub fn active_weights(&self) -> &[Percentage] {
        self.weight_source.weights()
    }

    /// Sum of the attributes' manual weights.
    pub fn weight_total(&self) -> u32 {
        total_weight(&self.attributes)
    }

    /// Returns true when the manual weights add up to exactly 100.
    pub fn is_weight_balanced(&self) -> bool {
        self.weight_total() == 100
    }

    /// Returns the best ranked scenario result.
    pub fn top_recommendation(&self) -> Option<&ScenarioResult> {
        Ranker::top_recommendation(&self.results)
    }

    // ───────────────────────────────────────────────────────────────
    // Mutations
    // ───────────────────────────────────────────────────────────────

    /// Sets the manual weight of an attribute and switches to manual weighting.
    ///
    /// Negative requests are clamped to zero. An increase is limited to the
    /// headroom left under a manual total of 100; a decrease always applies.
    ///
    /// Returns the applied weight.
    pub fn set_attribute_weight(
        &mut self,
        attribute_id: u32,
        requested: i64,
    ) -> Result<Percentage, AnalysisError> {
        let index = self.attribute_index(attribute_id)?;
        let current = i64::from(self.attributes[index].weight.value());
        let headroom = (100 - i64::from(self.weight_total())).max(0);

        let requested = requested.max(0);
        let applied = if requested > current {
            requested.min(current + headroom)
        } else {
            requested
        };
        let applied = Percentage::new(applied.min(100) as u8);

        self.attributes[index].weight = applied;
        self.weight_source = WeightSource::manual_from(&self.attributes);
        self.commit()?;
        Ok(applied)
    }

    /// Renames an attribute. Names must be non-empty and unique.
    pub fn rename_attribute(
        &mut self,
        attribute_id: u32,
        name: impl Into<String>,
    ) -> Result<(), AnalysisError> {
        let index = self.attribute_index(attribute_id)?;
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::empty_field("attribute.name").into());
        }
        if self
            .attributes
            .iter()
            .any(|a| a.id != attribute_id && a.name == name)
        {
            return Err(ValidationError::duplicate("attribute.name", name).into());
        }

        self.attributes[index].name = name;
        self.commit()
    }

    /// Sets one scenario's rating of the attribute at `attribute_index`.
    pub fn set_rating(
        &mut self,
        scenario_id: u32,
        attribute_index: usize,
        rating: i64,
    ) -> Result<(), AnalysisError> {
        let rating = Rating::try_new(rating)?;
        let attribute_count = self.attributes.len();
        if attribute_index >= attribute_count {
            return Err(ValidationError::out_of_range(
                "rating.index",
                0,
                attribute_count.saturating_sub(1) as i32,
                attribute_index.min(i32::MAX as usize) as i32,
            )
            .into());
        }

        let scenario = self
            .scenarios
            .iter_mut()
            .find(|s| s.id == scenario_id)
            .ok_or(AnalysisError::ScenarioNotFound(scenario_id))?;
        scenario.ratings[attribute_index] = rating;
        self.commit()
    }

    /// Records a slider judgment between attribute positions `i` and `j`.
    pub fn set_judgment(&mut self, i: usize, j: usize, slider: i64) -> Result<(), AnalysisError> {
        let slider = SliderPosition::try_new(slider)?;
        let mut matrix = self.matrix_or_default();
        matrix.set_judgment(i, j, slider)?;
        self.pairwise_matrix = Some(matrix);
        self.commit()
    }

    /// Records any ratio-scale judgment, including exact equality.
    pub fn set_ratio(
        &mut self,
        i: usize,
        j: usize,
        importance: Importance,
    ) -> Result<(), AnalysisError> {
        let mut matrix = self.matrix_or_default();
        matrix.set_ratio(i, j, importance)?;
        self.pairwise_matrix = Some(matrix);
        self.commit()
    }

    /// Switches to pairwise weighting and returns the derived weights.
    ///
    /// Equal judgments in the matrix are repaired as a side effect.
    pub fn derive_weights(&mut self) -> Result<Vec<Percentage>, AnalysisError> {
        self.weight_source = WeightSource::Derived(Vec::new());
        self.commit()?;
        Ok(self.active_weights().to_vec())
    }

    /// Switches back to the attributes' manual weights.
    pub fn use_manual_weights(&mut self) -> Result<(), AnalysisError> {
        self.weight_source = WeightSource::manual_from(&self.attributes);
        self.commit()
    }

    /// Adds a scenario rated against every attribute. Returns its id.
    pub fn add_scenario(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        ratings: &[i64],
    ) -> Result<u32, AnalysisError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::empty_field("scenario.name").into());
        }

        let id = self.scenarios.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        if ratings.len() != self.attributes.len() {
            return Err(AnalysisError::shape_mismatch(
                Shape::ScenarioRatings(id),
                self.attributes.len(),
                ratings.len(),
            ));
        }
        let ratings = ratings
            .iter()
            .map(|&r| Rating::try_new(r))
            .collect::<Result<Vec<_>, _>>()?;

        self.scenarios
            .push(Scenario::new(id, name, description, ratings));
        self.commit()?;
        Ok(id)
    }

    /// Removes a scenario and returns it.
    pub fn remove_scenario(&mut self, scenario_id: u32) -> Result<Scenario, AnalysisError> {
        let index = self
            .scenarios
            .iter()
            .position(|s| s.id == scenario_id)
            .ok_or(AnalysisError::ScenarioNotFound(scenario_id))?;

        let removed = self.scenarios.remove(index);
        self.commit()?;
        Ok(removed)
    }

    /// Renames the analysis itself.
    pub fn rename(
        &mut self,
        name: impl Into<String>,
        description: Option<String>,
    ) -> Result<(), AnalysisError> {
        self.name = validate_name(name.into())?;
        self.description = normalize_description(description);
        self.commit()
    }

    /// Recomputes weights (in pairwise mode) and ranked results.
    ///
    /// # Errors
    /// - `ShapeMismatch` if ratings or weights do not line up with the
    ///   attributes. Results are left untouched in that case.
    pub fn recompute(&mut self) -> Result<(), AnalysisError> {
        if self.weight_source.is_derived() {
            let weights = WeightDeriver::derive(self.matrix_mut());
            self.weight_source = WeightSource::Derived(weights);
        }

        let results = ScoringEngine::compute_results(
            &self.attributes,
            &self.scenarios,
            self.weight_source.weights(),
        )?;
        self.results = Ranker::rank(results);
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────
    // Persistence views
    // ───────────────────────────────────────────────────────────────

    /// Captures the persisted fields at the current revision.
    pub fn snapshot(&self) -> AnalysisSnapshot {
        AnalysisSnapshot {
            revision: self.revision,
            name: self.name.clone(),
            description: self.description.clone(),
            attributes: self.attributes.clone(),
            scenarios: self.scenarios.clone(),
            pairwise_matrix: self.pairwise_matrix.clone(),
            weight_source: self.weight_source.clone(),
            results: self.results.clone(),
            updated_at: self.updated_at,
        }
    }

    /// Converts the whole record to its stored document form.
    pub fn to_document(&self) -> AnalysisDocument {
        AnalysisDocument {
            id: Some(self.id),
            name: Some(self.name.clone()),
            description: self.description.clone(),
            attributes: Some(self.attributes.clone()),
            scenarios: Some(self.scenarios.clone()),
            pairwise_matrix: self.pairwise_matrix.clone(),
            weight_source: Some(self.weight_source.clone()),
            results: Some(self.results.clone()),
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        }
    }

    /// Builds the dashboard summary of this record.
    pub fn summary(&self) -> AnalysisSummary {
        AnalysisSummary {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            top_recommendation: self.top_recommendation().map(RecommendationSummary::from),
            updated_at: self.updated_at,
        }
    }

    // ───────────────────────────────────────────────────────────────
    // Internals
    // ───────────────────────────────────────────────────────────────

    fn attribute_index(&self, attribute_id: u32) -> Result<usize, AnalysisError> {
        self.attributes
            .iter()
            .position(|a| a.id == attribute_id)
            .ok_or(AnalysisError::AttributeNotFound(attribute_id))
    }

    fn matrix_or_default(&self) -> PairwiseMatrix {
        self.pairwise_matrix
            .clone()
            .unwrap_or_else(|| PairwiseMatrix::new(self.attributes.len()))
    }

    fn matrix_mut(&mut self) -> &mut PairwiseMatrix {
        let size = self.attributes.len();
        self.pairwise_matrix
            .get_or_insert_with(|| PairwiseMatrix::new(size))
    }

    fn commit(&mut self) -> Result<(), AnalysisError> {
        self.recompute()?;
        self.revision += 1;
        self.updated_at = Timestamp::now();
        Ok(())
    }
}

fn validate_name(name: String) -> Result<String, ValidationError> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(ValidationError::empty_field("name"));
    }
    Ok(name)
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> AnalysisRecord {
        AnalysisRecord::create("Packaging strategy", None).unwrap()
    }

    fn two_attribute_record(weights: [u8; 2], ratings: &[[u8; 2]]) -> AnalysisRecord {
        let attributes = vec![
            Attribute::new(1, "Cost", Percentage::new(weights[0])),
            Attribute::new(2, "Quality", Percentage::new(weights[1])),
        ];
        let scenarios = ratings
            .iter()
            .enumerate()
            .map(|(i, r)| {
                Scenario::new(
                    i as u32 + 1,
                    format!("S{}", i + 1),
                    "",
                    r.iter().map(|&v| Rating::new(v)).collect(),
                )
            })
            .collect();
        let weight_source = WeightSource::manual_from(&attributes);
        AnalysisRecord::reconstitute(
            AnalysisId::new(),
            "Test".to_string(),
            None,
            attributes,
            scenarios,
            None,
            weight_source,
            Timestamp::now(),
            Timestamp::now(),
        )
        .unwrap()
    }

    fn rank_of(record: &AnalysisRecord, scenario_id: u32) -> u32 {
        record
            .results()
            .iter()
            .find(|r| r.scenario_id() == scenario_id)
            .map(|r| r.rank)
            .unwrap()
    }

    // ───────────────────────────────────────────────────────────────
    // Creation
    // ───────────────────────────────────────────────────────────────

    #[test]
    fn create_seeds_from_template_and_ranks_results() {
        let record = record();

        assert_eq!(record.attributes().len(), 6);
        assert_eq!(record.scenarios().len(), 6);
        assert_eq!(record.results().len(), 6);
        assert_eq!(record.revision(), 0);
        assert!(record.is_weight_balanced());
        assert!(record.pairwise_matrix().is_none());
        assert_eq!(record.results()[0].rank, 1);
    }

    #[test]
    fn create_ranks_high_interface_consolidation_first() {
        let record = record();
        let top = record.top_recommendation().unwrap();
        assert_eq!(top.scenario.name, "High-Interface Package Consolidation");
        assert_eq!(top.weighted_score, 77.9);
    }

    #[test]
    fn create_rejects_blank_name() {
        let err = AnalysisRecord::create("   ", None).unwrap_err();
        assert_eq!(err, AnalysisError::Validation(ValidationError::empty_field("name")));
    }

    #[test]
    fn create_drops_blank_description() {
        let record = AnalysisRecord::create("A", Some("  ".to_string())).unwrap();
        assert_eq!(record.description(), None);
    }

    // ───────────────────────────────────────────────────────────────
    // Manual weights
    // ───────────────────────────────────────────────────────────────

    #[test]
    fn weight_increase_is_clamped_to_headroom() {
        let mut record = record();
        record.set_attribute_weight(4, 20).unwrap(); // 30 -> 20, total 90

        let applied = record.set_attribute_weight(1, 50).unwrap(); // 8 + 10 headroom
        assert_eq!(applied, Percentage::new(18));
        assert_eq!(record.weight_total(), 100);
    }

    #[test]
    fn weight_decrease_is_always_applied() {
        let mut record = record();
        let applied = record.set_attribute_weight(4, 5).unwrap();

        assert_eq!(applied, Percentage::new(5));
        assert_eq!(record.weight_total(), 75);
        assert!(!record.is_weight_balanced());
    }

    #[test]
    fn negative_weight_is_clamped_to_zero() {
        let mut record = record();
        let applied = record.set_attribute_weight(2, -7).unwrap();
        assert_eq!(applied, Percentage::ZERO);
    }

    #[test]
    fn increase_at_full_total_keeps_current_weight() {
        let mut record = record();
        let applied = record.set_attribute_weight(1, 40).unwrap();
        assert_eq!(applied, Percentage::new(8));
    }

    #[test]
    fn unknown_attribute_is_rejected() {
        let mut record = record();
        assert_eq!(
            record.set_attribute_weight(99, 10),
            Err(AnalysisError::AttributeNotFound(99))
        );
        assert_eq!(record.revision(), 0);
    }

    #[test]
    fn weight_edit_switches_back_to_manual() {
        let mut record = record();
        record.derive_weights().unwrap();
        assert!(record.weight_source().is_derived());

        record.set_attribute_weight(1, 8).unwrap();
        assert!(!record.weight_source().is_derived());
        assert_eq!(record.active_weights()[0], Percentage::new(8));
    }

    // ───────────────────────────────────────────────────────────────
    // Scoring through the record
    // ───────────────────────────────────────────────────────────────

    #[test]
    fn rating_edit_updates_score_and_rank() {
        let mut record = two_attribute_record([50, 50], &[[60, 60], [50, 50]]);
        assert_eq!(rank_of(&record, 1), 1);

        record.set_rating(2, 0, 100).unwrap();
        assert_eq!(rank_of(&record, 2), 1);
        assert_eq!(record.results()[0].weighted_score, 75.0);
        assert_eq!(record.revision(), 1);
    }

    #[test]
    fn rating_out_of_range_is_rejected() {
        let mut record = record();
        assert!(matches!(
            record.set_rating(1, 0, 101),
            Err(AnalysisError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert!(matches!(
            record.set_rating(1, 6, 50),
            Err(AnalysisError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert_eq!(
            record.set_rating(42, 0, 50),
            Err(AnalysisError::ScenarioNotFound(42))
        );
    }

    #[test]
    fn tied_scores_rank_lower_id_first() {
        let record = two_attribute_record([50, 50], &[[40, 60], [60, 40]]);
        assert_eq!(rank_of(&record, 1), 1);
        assert_eq!(rank_of(&record, 2), 2);
    }

    #[test]
    fn rename_attribute_rekeys_contributions() {
        let mut record = two_attribute_record([50, 50], &[[40, 60]]);
        record.rename_attribute(1, "Price").unwrap();

        let contributions = &record.results()[0].contribution_by_attr;
        assert!(contributions.contains_key("Price"));
        assert!(!contributions.contains_key("Cost"));
    }

    #[test]
    fn rename_attribute_rejects_duplicates() {
        let mut record = two_attribute_record([50, 50], &[[40, 60]]);
        assert!(matches!(
            record.rename_attribute(1, "Quality"),
            Err(AnalysisError::Validation(ValidationError::Duplicate { .. }))
        ));
    }

    // ───────────────────────────────────────────────────────────────
    // Pairwise weighting
    // ───────────────────────────────────────────────────────────────

    #[test]
    fn derive_weights_from_much_more_important_judgment() {
        let mut record = two_attribute_record([50, 50], &[[100, 0]]);
        record.set_judgment(0, 1, -5).unwrap();

        let weights = record.derive_weights().unwrap();

        assert_eq!(weights, vec![Percentage::new(83), Percentage::new(17)]);
        assert_eq!(record.results()[0].weighted_score, 83.0);
    }

    #[test]
    fn derive_weights_repairs_equal_judgment() {
        let mut record = two_attribute_record([50, 50], &[[100, 0]]);
        record.set_ratio(0, 1, Importance::Equal).unwrap();

        record.derive_weights().unwrap();

        let matrix = record.pairwise_matrix().unwrap();
        assert_eq!(matrix.get(0, 1), Some(Importance::SlightlyMore));
        assert_eq!(matrix.get(1, 0), Some(Importance::SlightlyLess));
    }

    #[test]
    fn judgments_in_derived_mode_update_weights() {
        let mut record = two_attribute_record([50, 50], &[[100, 0]]);
        record.derive_weights().unwrap();
        record.set_judgment(0, 1, 5).unwrap();

        assert_eq!(
            record.active_weights(),
            &[Percentage::new(17), Percentage::new(83)]
        );
    }

    #[test]
    fn invalid_judgment_leaves_record_untouched() {
        let mut record = record();
        assert!(record.set_judgment(0, 1, 2).is_err());
        assert!(record.set_judgment(0, 9, 3).is_err());
        assert_eq!(record.revision(), 0);
        assert!(record.pairwise_matrix().is_none());
    }

    #[test]
    fn use_manual_weights_restores_attribute_weights() {
        let mut record = record();
        record.derive_weights().unwrap();
        record.use_manual_weights().unwrap();

        let manual: Vec<_> = record.attributes().iter().map(|a| a.weight).collect();
        assert_eq!(record.active_weights(), manual.as_slice());
    }

    // ───────────────────────────────────────────────────────────────
    // Scenarios and naming
    // ───────────────────────────────────────────────────────────────

    #[test]
    fn add_scenario_assigns_next_id() {
        let mut record = record();
        let id = record
            .add_scenario("Hybrid", "", &[50, 50, 50, 50, 50, 50])
            .unwrap();

        assert_eq!(id, 7);
        assert_eq!(record.results().len(), 7);
    }

    #[test]
    fn add_scenario_requires_a_rating_per_attribute() {
        let mut record = record();
        assert_eq!(
            record.add_scenario("Short", "", &[50, 50]),
            Err(AnalysisError::shape_mismatch(Shape::ScenarioRatings(7), 6, 2))
        );
    }

    #[test]
    fn remove_scenario_drops_its_result() {
        let mut record = record();
        let removed = record.remove_scenario(2).unwrap();

        assert_eq!(removed.id, 2);
        assert!(record.results().iter().all(|r| r.scenario_id() != 2));
        assert_eq!(
            record.remove_scenario(2),
            Err(AnalysisError::ScenarioNotFound(2))
        );
    }

    #[test]
    fn rename_updates_name_and_revision() {
        let mut record = record();
        record
            .rename("Renamed", Some("New scope".to_string()))
            .unwrap();

        assert_eq!(record.name(), "Renamed");
        assert_eq!(record.description(), Some("New scope"));
        assert_eq!(record.revision(), 1);
    }

    #[test]
    fn snapshot_carries_revision() {
        let mut record = record();
        record.set_rating(1, 0, 10).unwrap();
        record.set_rating(1, 0, 20).unwrap();

        let snapshot = record.snapshot();
        assert_eq!(snapshot.revision, 2);
        assert_eq!(snapshot.results, record.results());
    }

    #[test]
    fn summary_reports_top_recommendation() {
        let record = record();
        let summary = record.summary();
        let top = summary.top_recommendation.unwrap();

        assert_eq!(summary.id, record.id());
        assert_eq!(top.scenario_id, 2);
    }
}
