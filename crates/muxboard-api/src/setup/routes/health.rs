//! Health check handlers and response types.

use crate::state::AppState;
use axum::{http::StatusCode, response::IntoResponse, Json};
use muxboard_services::StatusUpdateMetricsSnapshot;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Run an async check with timeout; returns status string "healthy", "timeout", or "{prefix}: {error}".
async fn run_check<F, E>(timeout: Duration, f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

fn configured(flag: bool) -> String {
    if flag { "configured" } else { "missing" }.to_string()
}

#[derive(serde::Serialize)]
pub(super) struct HealthCheckResponse {
    pub status: String,
    pub status_store: String,
    pub provider_credentials: String,
    pub webhook_secret: String,
    pub status_updates: StatusUpdateMetricsSnapshot,
}

/// Liveness probe - process is running.
pub async fn liveness_check(_state: Arc<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Full health check: status store reachability, configuration presence and
/// status update counters.
pub async fn health_check(state: Arc<AppState>) -> impl IntoResponse {
    const TIMEOUT: Duration = Duration::from_secs(5);

    let store = state.status_updates.store().clone();
    let status_store = run_check(
        TIMEOUT,
        async move { store.get("health-check-non-existent-asset").await.map(drop) },
        "unhealthy",
    )
    .await;
    let overall_healthy = status_store == "healthy";

    let response = HealthCheckResponse {
        status: if overall_healthy { "healthy" } else { "unhealthy" }.to_string(),
        status_store,
        provider_credentials: configured(state.config.has_provider_credentials()),
        webhook_secret: configured(state.verifier.is_configured()),
        status_updates: state.status_updates.metrics(),
    };

    let status_code = if overall_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
