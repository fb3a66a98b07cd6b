//! MFA Analyzer HTTP server.

use std::sync::Arc;

use mfa_analyzer::adapters::http::{app_router, AnalysisHandlers};
use mfa_analyzer::adapters::postgres::PostgresAnalysisStore;
use mfa_analyzer::adapters::storage::{FileAnalysisStore, InMemoryAnalysisStore};
use mfa_analyzer::config::{AppConfig, ConfigError, StorageBackend, ValidationError};
use mfa_analyzer::ports::AnalysisStore;
use mfa_analyzer::telemetry;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    config.validate().map_err(ConfigError::from)?;
    telemetry::init(&config.logging)?;

    let store = build_store(&config).await?;
    let handlers = AnalysisHandlers::from_store(store, config.autosave.to_autosave_config())
        .with_idle_timeout(config.autosave.session_idle_timeout());
    let sweeper = handlers.spawn_idle_sweeper();
    let app = app_router(handlers.clone(), config.server.request_timeout());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        environment = ?config.server.environment,
        backend = ?config.storage.backend,
        "MFA analyzer listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    handlers.close_all().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn build_store(config: &AppConfig) -> Result<Arc<dyn AnalysisStore>, BoxError> {
    let store: Arc<dyn AnalysisStore> = match config.storage.backend {
        StorageBackend::Memory => Arc::new(InMemoryAnalysisStore::new()),
        StorageBackend::File => Arc::new(FileAnalysisStore::new(&config.storage.data_dir)),
        StorageBackend::Postgres => {
            let database = config
                .database
                .as_ref()
                .ok_or(ValidationError::MissingRequired("DATABASE_URL"))?;
            let store = PostgresAnalysisStore::new(database.connect().await?);
            if database.run_migrations {
                store.run_migrations().await?;
            }
            Arc::new(store)
        }
    };
    Ok(store)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
