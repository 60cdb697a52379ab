//! agentdesk API Server Entry Point
//!
//! Bootstraps configuration, builds the record store and starts the Axum
//! HTTP server.

use std::sync::Arc;

use agentdesk_api::telemetry::{init_tracing, TelemetryConfig};
use agentdesk_api::{
    create_api_router, AgentService, ApiConfig, ApiError, ApiResult, DbClient, DbConfig,
    StoreBackend,
};
use agentdesk_storage::{AgentRepository, InMemoryAgentRepository};

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracing(&telemetry_config)?;

    let api_config = ApiConfig::from_env()?;
    let repo = build_repository(&api_config).await?;
    let service = AgentService::new(repo);

    let app = create_api_router(service, &api_config);

    let addr = api_config.bind_addr()?;
    tracing::info!(%addr, store = %api_config.store, "Starting agentdesk API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn build_repository(config: &ApiConfig) -> ApiResult<Arc<dyn AgentRepository>> {
    match config.store {
        StoreBackend::Postgres => {
            let db = DbClient::from_config(&DbConfig::from_env())?
                .with_case_sensitive_search(config.search_case_sensitive);
            db.migrate().await?;
            Ok(Arc::new(db))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; records are lost on exit");
            Ok(Arc::new(InMemoryAgentRepository::with_case_sensitive_search(
                config.search_case_sensitive,
            )))
        }
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
