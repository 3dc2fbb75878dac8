//! Application builder — wires store + state + router and runs the server.

use std::sync::Arc;

use shopfront_cache::provider::StoreManager;
use shopfront_core::config::AppConfig;
use shopfront_core::error::AppError;

use crate::router::build_router;
use crate::state::AppState;

/// Runs the Shopfront server with the given configuration.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(
        provider = %config.store.provider,
        "Initializing durable store"
    );
    let store = Arc::new(StoreManager::new(&config.store).await?);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, store);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Shopfront server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
}
