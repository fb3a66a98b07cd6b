//! DeleteAnalysisHandler - Command handler for deleting analyses.

use std::sync::Arc;

use crate::domain::analysis::RecordState;
use crate::domain::foundation::{AnalysisId, StateMachine};
use crate::ports::AnalysisStore;

use super::{AnalysisCommandError, AnalysisSession};

/// Handler for deleting analyses.
pub struct DeleteAnalysisHandler {
    store: Arc<dyn AnalysisStore>,
}

impl DeleteAnalysisHandler {
    pub fn new(store: Arc<dyn AnalysisStore>) -> Self {
        Self { store }
    }

    /// Deletes an analysis, closing its open session first.
    ///
    /// A pending save of the session is discarded; a save in flight is
    /// awaited so it cannot recreate the record after deletion.
    pub async fn handle(
        &self,
        id: AnalysisId,
        session: Option<AnalysisSession>,
    ) -> Result<RecordState, AnalysisCommandError> {
        let state = match session {
            Some(session) => session.close().await.1,
            None => RecordState::Loaded,
        };
        let state = state.transition_to(RecordState::Deleted).map_err(|_| {
            AnalysisCommandError::InvalidStateTransition {
                from: state,
                to: RecordState::Deleted,
            }
        })?;

        self.store.delete(id).await?;

        tracing::info!(analysis_id = %id, "Analysis deleted");
        Ok(state)
    }
}
