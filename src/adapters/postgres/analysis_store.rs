//! PostgreSQL implementation of AnalysisStore.
//!
//! Persists analyses to the `analyses` table, one JSONB column per document field.

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use crate::domain::analysis::{AnalysisDocument, AnalysisRecord, AnalysisSnapshot, AnalysisSummary};
use crate::domain::foundation::{AnalysisId, Timestamp};
use crate::ports::{AnalysisStore, StoreError};

/// Columns holding JSON documents, in stored-document key order.
const JSON_COLUMNS: [&str; 5] = [
    "attributes",
    "scenarios",
    "pairwise_matrix",
    "weight_source",
    "results",
];

/// PostgreSQL implementation of AnalysisStore.
#[derive(Clone)]
pub struct PostgresAnalysisStore {
    pool: PgPool,
}

impl PostgresAnalysisStore {
    /// Creates a new PostgresAnalysisStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the bundled schema migrations.
    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(format!("Failed to run migrations: {}", e)))
    }
}

#[async_trait]
impl AnalysisStore for PostgresAnalysisStore {
    async fn create(&self, record: &AnalysisRecord) -> Result<AnalysisRecord, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO analyses (
                id, name, description, attributes, scenarios, pairwise_matrix,
                weight_source, results, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(record.id().as_uuid())
        .bind(record.name())
        .bind(record.description())
        .bind(Json(record.attributes()))
        .bind(Json(record.scenarios()))
        .bind(record.pairwise_matrix().map(Json))
        .bind(Json(record.weight_source()))
        .bind(Json(record.results()))
        .bind(record.created_at().as_datetime())
        .bind(record.updated_at().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("insert analysis", e))?;

        Ok(record.clone())
    }

    async fn load(&self, id: AnalysisId) -> Result<Value, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, attributes, scenarios, pairwise_matrix,
                   weight_source, results, created_at, updated_at
            FROM analyses
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("fetch analysis", e))?
        .ok_or(StoreError::NotFound(id))?;

        row_to_document(&row)
    }

    async fn save(&self, id: AnalysisId, snapshot: &AnalysisSnapshot) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE analyses SET
                name = $2,
                description = $3,
                attributes = $4,
                scenarios = $5,
                pairwise_matrix = $6,
                weight_source = $7,
                results = $8,
                updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(&snapshot.name)
        .bind(snapshot.description.as_deref())
        .bind(Json(&snapshot.attributes))
        .bind(Json(&snapshot.scenarios))
        .bind(snapshot.pairwise_matrix.as_ref().map(Json))
        .bind(Json(&snapshot.weight_source))
        .bind(Json(&snapshot.results))
        .bind(snapshot.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("update analysis", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        Ok(())
    }

    async fn delete(&self, id: AnalysisId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM analyses WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("delete analysis", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        Ok(())
    }

    async fn list(&self) -> Result<Vec<AnalysisSummary>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, results, created_at, updated_at
            FROM analyses
            ORDER BY updated_at DESC, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list analyses", e))?;

        let mut summaries = Vec::with_capacity(rows.len());
        for row in rows {
            let id = AnalysisId::from_uuid(get(&row, "id")?);
            let mut document = AnalysisDocument {
                name: get(&row, "name")?,
                description: get(&row, "description")?,
                created_at: Some(Timestamp::from_datetime(get(&row, "created_at")?)),
                updated_at: Some(Timestamp::from_datetime(get(&row, "updated_at")?)),
                ..AnalysisDocument::default()
            };
            let results: Option<Value> = get(&row, "results")?;
            match results.map(serde_json::from_value).transpose() {
                Ok(results) => document.results = results,
                Err(e) => {
                    tracing::warn!(analysis_id = %id, error = %e, "Ignoring malformed stored results")
                }
            }
            summaries.push(document.summary(id));
        }

        Ok(summaries)
    }
}

/// Reassembles the stored JSON document from a full row.
fn row_to_document(row: &PgRow) -> Result<Value, StoreError> {
    let mut document = Map::new();

    let id: uuid::Uuid = get(row, "id")?;
    document.insert("id".into(), Value::String(id.to_string()));

    let name: String = get(row, "name")?;
    document.insert("name".into(), Value::String(name));

    let description: Option<String> = get(row, "description")?;
    document.insert(
        "description".into(),
        description.map(Value::String).unwrap_or(Value::Null),
    );

    for column in JSON_COLUMNS {
        let value: Option<Value> = get(row, column)?;
        document.insert(column.into(), value.unwrap_or(Value::Null));
    }

    for column in ["created_at", "updated_at"] {
        let at: chrono::DateTime<chrono::Utc> = get(row, column)?;
        let at = serde_json::to_value(Timestamp::from_datetime(at))
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        document.insert(column.into(), at);
    }

    Ok(Value::Object(document))
}

fn get<'r, T>(row: &'r PgRow, column: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(column)
        .map_err(|e| StoreError::Database(format!("Failed to get {}: {}", column, e)))
}

fn db_error(action: &str, e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(format!("Failed to {}: {}", action, e))
        }
        e => StoreError::Database(format!("Failed to {}: {}", action, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_timeouts_are_unavailable() {
        let err = db_error("fetch analysis", sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(err.to_string().contains("fetch analysis"));
    }

    #[test]
    fn missing_rows_are_database_errors() {
        let err = db_error("update analysis", sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[test]
    fn json_columns_match_document_fields() {
        let record = AnalysisRecord::create("Columns", None).unwrap();
        let document = record.to_document().to_value().unwrap();
        for column in JSON_COLUMNS {
            assert!(document.get(column).is_some(), "missing {}", column);
        }
    }
}
