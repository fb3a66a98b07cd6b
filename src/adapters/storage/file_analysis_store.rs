//! File-based Analysis Store Adapter
//!
//! Stores each analysis as one YAML file named after its id.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::fs;

use crate::domain::analysis::{AnalysisDocument, AnalysisRecord, AnalysisSnapshot, AnalysisSummary};
use crate::domain::foundation::AnalysisId;
use crate::ports::{AnalysisStore, StoreError};

use super::newest_first;

const EXTENSION: &str = "yaml";

/// File-based storage for analysis documents
#[derive(Debug, Clone)]
pub struct FileAnalysisStore {
    base_path: PathBuf,
}

impl FileAnalysisStore {
    /// Create a new file store with a base directory
    ///
    /// # Example
    /// ```ignore
    /// let store = FileAnalysisStore::new("./data/analyses");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Get the file path for an analysis
    fn file_path(&self, id: AnalysisId) -> PathBuf {
        self.base_path.join(format!("{}.{}", id, EXTENSION))
    }

    /// Ensure the base directory exists
    async fn ensure_dir(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))
    }

    async fn read_document(&self, id: AnalysisId) -> Result<Value, StoreError> {
        let file_path = self.file_path(id);
        if !fs::try_exists(&file_path)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?
        {
            return Err(StoreError::NotFound(id));
        }

        let yaml = fs::read_to_string(&file_path)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;

        serde_yaml::from_str(&yaml).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    async fn write_document(&self, id: AnalysisId, document: &Value) -> Result<(), StoreError> {
        self.ensure_dir().await?;

        let yaml =
            serde_yaml::to_string(document).map_err(|e| StoreError::Serialization(e.to_string()))?;

        fs::write(self.file_path(id), yaml)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))
    }
}

#[async_trait]
impl AnalysisStore for FileAnalysisStore {
    async fn create(&self, record: &AnalysisRecord) -> Result<AnalysisRecord, StoreError> {
        let document = record
            .to_document()
            .to_value()
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        self.write_document(record.id(), &document).await?;
        Ok(record.clone())
    }

    async fn load(&self, id: AnalysisId) -> Result<Value, StoreError> {
        self.read_document(id).await
    }

    async fn save(&self, id: AnalysisId, snapshot: &AnalysisSnapshot) -> Result<(), StoreError> {
        let mut document = self.read_document(id).await?;
        snapshot
            .merge_into(&mut document)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.write_document(id, &document).await
    }

    async fn delete(&self, id: AnalysisId) -> Result<(), StoreError> {
        match fs::remove_file(self.file_path(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound(id)),
            Err(e) => Err(StoreError::Io(e.to_string())),
        }
    }

    async fn list(&self) -> Result<Vec<AnalysisSummary>, StoreError> {
        self.ensure_dir().await?;

        let mut entries = fs::read_dir(&self.base_path)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;

        let mut summaries = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| AnalysisId::from_str(s).ok())
            else {
                continue;
            };

            let summary = self
                .read_document(id)
                .await
                .and_then(|value| {
                    AnalysisDocument::from_value(value)
                        .map_err(|e| StoreError::Serialization(e.to_string()))
                })
                .map(|document| document.summary(id));
            match summary {
                Ok(summary) => summaries.push(summary),
                Err(e) => tracing::warn!(analysis_id = %id, error = %e, "Skipping unreadable analysis"),
            }
        }

        Ok(newest_first(summaries))
    }
}
