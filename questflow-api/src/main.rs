//! QUESTFLOW API Server Entry Point
//!
//! Loads configuration, connects the store and serves the Axum router until
//! interrupted.

use axum::Router;
use questflow_api::telemetry::{init_tracing, TelemetryConfig};
use questflow_api::{
    connect_store, create_api_router, resolve_bind_addr, ApiConfig, ApiError, ApiResult, AppState,
};
use questflow_core::RewardsConfig;

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::default();
    init_tracing(&telemetry_config)?;

    let api_config = ApiConfig::from_env()?;
    let rewards = RewardsConfig::from_env().map_err(|e| {
        ApiError::internal_error(format!("Invalid rewards configuration: {}", e))
    })?;
    tracing::info!(
        milestones = rewards.milestones.milestones().len(),
        repeat_interval = rewards.milestones.repeat_interval(),
        public_base_url = %rewards.public_base_url,
        "Rewards configuration loaded"
    );

    let store = connect_store(api_config.store).await?;
    let state = AppState::new(store, rewards);
    let app: Router = create_api_router(state, &api_config);

    let addr = resolve_bind_addr()?;
    tracing::info!(%addr, "Starting QUESTFLOW API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
