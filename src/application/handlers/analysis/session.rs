//! AnalysisSession - An open analysis paired with its AutoSaver.
//!
//! Every successful mutation recomputes results synchronously and schedules
//! a debounced save of the new revision. Saving never blocks editing.

use std::sync::Arc;

use tokio::sync::watch;

use crate::application::autosave::{AutoSaveConfig, AutoSaver, SyncStatus};
use crate::domain::analysis::{AnalysisError, AnalysisRecord, Importance, RecordState, Scenario};
use crate::domain::foundation::{AnalysisId, Percentage};
use crate::ports::AnalysisStore;

/// One open analysis and its background persistence.
pub struct AnalysisSession {
    record: AnalysisRecord,
    saver: AutoSaver,
}

impl AnalysisSession {
    /// Opens a session on a record that is already stored at its current revision.
    pub fn open(
        record: AnalysisRecord,
        store: Arc<dyn AnalysisStore>,
        config: AutoSaveConfig,
    ) -> Self {
        let saver = AutoSaver::spawn(
            record.id(),
            store,
            config,
            SyncStatus::saved_at(record.revision()),
        );
        Self { record, saver }
    }

    pub fn id(&self) -> AnalysisId {
        self.record.id()
    }

    pub fn record(&self) -> &AnalysisRecord {
        &self.record
    }

    /// Returns the persistence state of the record.
    pub fn state(&self) -> RecordState {
        self.saver.status().record_state(self.record.revision())
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.saver.status()
    }

    /// Subscribes to sync status changes.
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.saver.subscribe()
    }

    /// Applies a mutation and schedules a save if it produced a new revision.
    pub fn edit<T>(
        &mut self,
        mutation: impl FnOnce(&mut AnalysisRecord) -> Result<T, AnalysisError>,
    ) -> Result<T, AnalysisError> {
        let before = self.record.revision();
        let output = mutation(&mut self.record)?;
        if self.record.revision() != before {
            tracing::debug!(
                analysis_id = %self.record.id(),
                revision = self.record.revision(),
                "Analysis recomputed"
            );
            self.saver.schedule(self.record.snapshot());
        }
        Ok(output)
    }

    pub fn set_attribute_weight(
        &mut self,
        attribute_id: u32,
        weight: i64,
    ) -> Result<Percentage, AnalysisError> {
        self.edit(|r| r.set_attribute_weight(attribute_id, weight))
    }

    pub fn rename_attribute(&mut self, attribute_id: u32, name: String) -> Result<(), AnalysisError> {
        self.edit(|r| r.rename_attribute(attribute_id, name))
    }

    pub fn set_rating(
        &mut self,
        scenario_id: u32,
        attribute_index: usize,
        rating: i64,
    ) -> Result<(), AnalysisError> {
        self.edit(|r| r.set_rating(scenario_id, attribute_index, rating))
    }

    pub fn set_judgment(&mut self, i: usize, j: usize, slider: i64) -> Result<(), AnalysisError> {
        self.edit(|r| r.set_judgment(i, j, slider))
    }

    pub fn set_ratio(
        &mut self,
        i: usize,
        j: usize,
        importance: Importance,
    ) -> Result<(), AnalysisError> {
        self.edit(|r| r.set_ratio(i, j, importance))
    }

    pub fn derive_weights(&mut self) -> Result<Vec<Percentage>, AnalysisError> {
        self.edit(|r| r.derive_weights())
    }

    pub fn use_manual_weights(&mut self) -> Result<(), AnalysisError> {
        self.edit(|r| r.use_manual_weights())
    }

    pub fn add_scenario(
        &mut self,
        name: String,
        description: String,
        ratings: &[i64],
    ) -> Result<u32, AnalysisError> {
        self.edit(|r| r.add_scenario(name, description, ratings))
    }

    pub fn remove_scenario(&mut self, scenario_id: u32) -> Result<Scenario, AnalysisError> {
        self.edit(|r| r.remove_scenario(scenario_id))
    }

    pub fn rename(&mut self, name: String, description: Option<String>) -> Result<(), AnalysisError> {
        self.edit(|r| r.rename(name, description))
    }

    /// Re-saves the current revision immediately, e.g. after a failed save.
    pub fn save_now(&self) {
        self.saver.save_now(self.record.snapshot());
    }

    /// Closes the session, discarding a save that has not fired yet.
    ///
    /// Returns the record and its final persistence state.
    pub async fn close(self) -> (AnalysisRecord, RecordState) {
        let status = self.saver.close().await;
        let state = status.record_state(self.record.revision());
        (self.record, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryAnalysisStore;
    use crate::domain::foundation::StateMachine;
    use std::time::Duration;

    async fn open_session() -> (AnalysisSession, Arc<InMemoryAnalysisStore>) {
        let store = Arc::new(InMemoryAnalysisStore::new());
        let record = AnalysisRecord::create("Session", None).unwrap();
        store.create(&record).await.unwrap();
        let session = AnalysisSession::open(record, store.clone(), AutoSaveConfig::default());
        (session, store)
    }

    #[tokio::test(start_paused = true)]
    async fn opened_session_is_loaded() {
        let (session, _) = open_session().await;
        assert_eq!(session.state(), RecordState::Loaded);
    }

    #[tokio::test(start_paused = true)]
    async fn edit_marks_dirty_until_saved() {
        let (mut session, _) = open_session().await;
        session.set_rating(1, 0, 10).unwrap();
        assert_eq!(session.state(), RecordState::Dirty);

        tokio::time::sleep(Duration::from_millis(1001)).await;
        let mut status = session.subscribe();
        status.wait_for(|s| s.last_saved == Some(1)).await.unwrap();

        assert_eq!(session.state(), RecordState::Loaded);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_edit_schedules_nothing() {
        let (mut session, _) = open_session().await;
        assert!(session.set_rating(1, 0, 500).is_err());
        assert_eq!(session.state(), RecordState::Loaded);
    }

    #[tokio::test(start_paused = true)]
    async fn close_returns_dirty_record_when_edit_was_pending() {
        let (mut session, store) = open_session().await;
        session.set_rating(1, 0, 10).unwrap();

        let (record, state) = session.close().await;

        assert_eq!(state, RecordState::Dirty);
        assert!(state.can_transition_to(&RecordState::Deleted));
        let stored = store.load(record.id()).await.unwrap();
        assert_eq!(stored["scenarios"][0]["ratings"][0], 85);
    }
}
