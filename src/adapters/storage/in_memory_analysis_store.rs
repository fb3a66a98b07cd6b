//! In-Memory Analysis Store Adapter
//!
//! Stores analysis documents as JSON values in memory.
//! Useful for testing and development.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::analysis::{AnalysisDocument, AnalysisRecord, AnalysisSnapshot, AnalysisSummary};
use crate::domain::foundation::AnalysisId;
use crate::ports::{AnalysisStore, StoreError};

use super::newest_first;

/// In-memory storage for analysis documents
#[derive(Debug, Clone)]
pub struct InMemoryAnalysisStore {
    documents: Arc<RwLock<HashMap<AnalysisId, Value>>>,
}

impl InMemoryAnalysisStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a raw document, bypassing validation (useful for tests)
    pub async fn insert_raw(&self, id: AnalysisId, document: Value) {
        self.documents.write().await.insert(id, document);
    }

    /// Clear all stored data (useful for tests)
    pub async fn clear(&self) {
        self.documents.write().await.clear();
    }

    /// Get the number of stored analyses
    pub async fn count(&self) -> usize {
        self.documents.read().await.len()
    }
}

impl Default for InMemoryAnalysisStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalysisStore for InMemoryAnalysisStore {
    async fn create(&self, record: &AnalysisRecord) -> Result<AnalysisRecord, StoreError> {
        let document = record
            .to_document()
            .to_value()
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        self.documents.write().await.insert(record.id(), document);
        Ok(record.clone())
    }

    async fn load(&self, id: AnalysisId) -> Result<Value, StoreError> {
        let documents = self.documents.read().await;
        documents.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    async fn save(&self, id: AnalysisId, snapshot: &AnalysisSnapshot) -> Result<(), StoreError> {
        let mut documents = self.documents.write().await;
        let document = documents.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        snapshot
            .merge_into(document)
            .map_err(|e| StoreError::Serialization(e.to_string()))
    }

    async fn delete(&self, id: AnalysisId) -> Result<(), StoreError> {
        self.documents
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    async fn list(&self) -> Result<Vec<AnalysisSummary>, StoreError> {
        let documents = self.documents.read().await;
        let mut summaries = Vec::with_capacity(documents.len());
        for (id, value) in documents.iter() {
            match AnalysisDocument::from_value(value.clone()) {
                Ok(document) => summaries.push(document.summary(*id)),
                Err(e) => tracing::warn!(analysis_id = %id, error = %e, "Skipping malformed analysis"),
            }
        }
        Ok(newest_first(summaries))
    }
}
