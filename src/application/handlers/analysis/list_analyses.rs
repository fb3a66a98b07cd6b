//! ListAnalysesHandler - Query handler for the dashboard listing.

use std::sync::Arc;

use crate::domain::analysis::AnalysisSummary;
use crate::ports::AnalysisStore;

use super::AnalysisCommandError;

/// Handler for listing analyses, most recently updated first.
pub struct ListAnalysesHandler {
    store: Arc<dyn AnalysisStore>,
}

impl ListAnalysesHandler {
    pub fn new(store: Arc<dyn AnalysisStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self) -> Result<Vec<AnalysisSummary>, AnalysisCommandError> {
        Ok(self.store.list().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryAnalysisStore;
    use crate::domain::analysis::AnalysisRecord;

    #[tokio::test]
    async fn lists_stored_analyses() {
        let store = Arc::new(InMemoryAnalysisStore::new());
        store
            .create(&AnalysisRecord::create("Listed", None).unwrap())
            .await
            .unwrap();

        let summaries = ListAnalysesHandler::new(store).handle().await.unwrap();

        assert_eq!(summaries.len(), 1);
        assert_eq!(
            summaries[0].top_recommendation.as_ref().map(|t| t.scenario_id),
            Some(2)
        );
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let handler = ListAnalysesHandler::new(Arc::new(InMemoryAnalysisStore::new()));
        assert!(handler.handle().await.unwrap().is_empty());
    }
}
