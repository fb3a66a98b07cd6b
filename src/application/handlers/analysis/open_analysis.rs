//! OpenAnalysisHandler - Loads a stored analysis into an editable session.

use std::sync::Arc;

use crate::application::autosave::AutoSaveConfig;
use crate::domain::analysis::{AnalysisDocument, AnalysisRecord};
use crate::domain::foundation::AnalysisId;
use crate::ports::AnalysisStore;

use super::{AnalysisCommandError, AnalysisSession};

/// Handler for opening analyses.
pub struct OpenAnalysisHandler {
    store: Arc<dyn AnalysisStore>,
    config: AutoSaveConfig,
}

impl OpenAnalysisHandler {
    pub fn new(store: Arc<dyn AnalysisStore>, config: AutoSaveConfig) -> Self {
        Self { store, config }
    }

    /// Loads the record, recomputes its results and starts its AutoSaver.
    pub async fn handle(&self, id: AnalysisId) -> Result<AnalysisSession, AnalysisCommandError> {
        let record = self.load(id).await?;

        tracing::debug!(analysis_id = %id, "Analysis opened");
        Ok(AnalysisSession::open(
            record,
            Arc::clone(&self.store),
            self.config.clone(),
        ))
    }

    /// Loads the record and recomputes its results without opening a session.
    pub async fn load(&self, id: AnalysisId) -> Result<AnalysisRecord, AnalysisCommandError> {
        let value = self.store.load(id).await?;

        let record = AnalysisDocument::from_value(value)
            .and_then(|document| document.into_record(id))
            .map_err(|e| {
                tracing::warn!(analysis_id = %id, error = %e, "Stored analysis could not be loaded");
                e
            })?;
        Ok(record)
    }
}
