//! CreateAnalysisHandler - Command handler for creating new analyses.

use std::sync::Arc;

use crate::domain::analysis::AnalysisRecord;
use crate::ports::AnalysisStore;

use super::AnalysisCommandError;

/// Command to create a new analysis from the default template.
#[derive(Debug, Clone)]
pub struct CreateAnalysisCommand {
    pub name: String,
    pub description: Option<String>,
}

/// Handler for creating analyses.
pub struct CreateAnalysisHandler {
    store: Arc<dyn AnalysisStore>,
}

impl CreateAnalysisHandler {
    pub fn new(store: Arc<dyn AnalysisStore>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        cmd: CreateAnalysisCommand,
    ) -> Result<AnalysisRecord, AnalysisCommandError> {
        // 1. Seed the record from the template and compute its results
        let record = AnalysisRecord::create(cmd.name, cmd.description)?;

        // 2. Persist
        let record = self.store.create(&record).await?;

        tracing::info!(analysis_id = %record.id(), name = record.name(), "Analysis created");
        Ok(record)
    }
}
