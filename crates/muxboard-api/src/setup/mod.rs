//! Application setup and initialization

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use muxboard_core::Config;
use muxboard_infra::{init_telemetry, LogFormat};
use muxboard_services::{InMemoryAssetStatusStore, MuxService, MuxServiceConfig};
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    init_telemetry(
        LogFormat::from_config(&config.base.log_format),
        env!("CARGO_PKG_NAME"),
        config.environment(),
    )
    .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!("Configuration loaded and validated successfully");

    if config.webhook_secret().is_none() {
        tracing::warn!(
            "MUX_WEBHOOK_SECRET is not set - every webhook request will be rejected"
        );
    }
    if !config.has_provider_credentials() {
        tracing::warn!(
            "MUX_TOKEN_ID / MUX_TOKEN_SECRET are not set - upload, list and delete will fail"
        );
    }

    let provider = MuxService::new(MuxServiceConfig::from(&config.mux))
        .context("Failed to initialize Mux client")?;
    let status_store = Arc::new(InMemoryAssetStatusStore::new());

    let state = AppState::new(config.clone(), Arc::new(provider), status_store);

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
