//! Application state shared by all handlers.

use muxboard_core::Config;
use muxboard_infra::SignatureVerifier;
use muxboard_services::{
    AssetStatusStore, StatusUpdateService, StatusUpdateServiceConfig, VideoProvider,
};
use std::sync::Arc;

/// Immutable after startup; handlers receive it as `State<Arc<AppState>>`.
pub struct AppState {
    pub config: Config,
    pub verifier: SignatureVerifier,
    pub provider: Arc<dyn VideoProvider>,
    pub status_updates: StatusUpdateService,
}

impl AppState {
    /// Build the state from its collaborators. Spawns the status retry worker,
    /// so it must run inside a Tokio runtime.
    pub fn new(
        config: Config,
        provider: Arc<dyn VideoProvider>,
        status_store: Arc<dyn AssetStatusStore>,
    ) -> Arc<Self> {
        let verifier = SignatureVerifier::new(config.webhook_secret())
            .with_tolerance(config.mux.webhook_tolerance_secs);
        let status_updates = StatusUpdateService::new(
            status_store,
            StatusUpdateServiceConfig::from(&config.status_updates),
        );

        Arc::new(Self {
            config,
            verifier,
            provider,
            status_updates,
        })
    }
}
