#![allow(dead_code)]

use async_trait::async_trait;
use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use muxboard_api::setup::routes::setup_routes;
use muxboard_api::AppState;
use muxboard_core::{
    Asset, AssetStatus, AssetStatusRecord, Config, PlaybackId, TransitionOutcome, UploadTicket,
};
use muxboard_infra::webhook::signature_header;
use muxboard_services::{
    AssetStatusStore, InMemoryAssetStatusStore, ProviderError, StatusStoreError, VideoProvider,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub const WEBHOOK_SECRET: &str = "whsec_integration_secret";
pub const TIMESTAMP: &str = "1700000000";

/// Provider fake that serves a fixed asset list and records calls.
#[derive(Default)]
pub struct FakeProvider {
    pub assets: Mutex<Vec<Asset>>,
    pub uploads: Mutex<Vec<(String, String)>>,
    pub deleted: Mutex<Vec<String>>,
    pub list_limits: Mutex<Vec<u32>>,
    pub fail_with: Mutex<Option<String>>,
}

impl FakeProvider {
    pub fn with_assets(assets: Vec<Asset>) -> Self {
        Self {
            assets: Mutex::new(assets),
            ..Default::default()
        }
    }

    pub fn fail(&self, message: &str) {
        *self.fail_with.lock().unwrap() = Some(message.to_string());
    }

    fn check_failure(&self) -> Result<(), ProviderError> {
        match self.fail_with.lock().unwrap().clone() {
            Some(message) => Err(ProviderError::Api {
                status: 500,
                message,
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl VideoProvider for FakeProvider {
    async fn create_direct_upload(
        &self,
        title: &str,
        description: &str,
    ) -> Result<UploadTicket, ProviderError> {
        self.check_failure()?;
        self.uploads
            .lock()
            .unwrap()
            .push((title.to_string(), description.to_string()));
        Ok(UploadTicket {
            id: "upload-1".to_string(),
            url: "https://storage.example.com/upload-1".to_string(),
        })
    }

    async fn list_assets(&self, limit: u32) -> Result<Vec<Asset>, ProviderError> {
        self.check_failure()?;
        self.list_limits.lock().unwrap().push(limit);
        let assets = self.assets.lock().unwrap();
        Ok(assets.iter().take(limit as usize).cloned().collect())
    }

    async fn delete_asset(&self, asset_id: &str) -> Result<(), ProviderError> {
        muxboard_services::validate_asset_id(asset_id)?;
        self.check_failure()?;
        let mut assets = self.assets.lock().unwrap();
        let before = assets.len();
        assets.retain(|a| a.id != asset_id);
        if assets.len() == before {
            return Err(ProviderError::NotFound(asset_id.to_string()));
        }
        self.deleted.lock().unwrap().push(asset_id.to_string());
        Ok(())
    }
}

/// Status store that records every write it is asked to make.
#[derive(Default)]
pub struct RecordingStatusStore {
    pub calls: Mutex<Vec<(String, AssetStatus)>>,
    pub failing: AtomicBool,
    pub slow_reads: AtomicBool,
    inner: InMemoryAssetStatusStore,
}

impl RecordingStatusStore {
    pub fn calls(&self) -> Vec<(String, AssetStatus)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Make every `get` hang, as a stalled backing store would.
    pub fn set_slow_reads(&self, slow: bool) {
        self.slow_reads.store(slow, Ordering::SeqCst);
    }
}

#[async_trait]
impl AssetStatusStore for RecordingStatusStore {
    async fn record_transition(
        &self,
        asset_id: &str,
        status: AssetStatus,
    ) -> Result<TransitionOutcome, StatusStoreError> {
        self.calls
            .lock()
            .unwrap()
            .push((asset_id.to_string(), status));
        if self.failing.load(Ordering::SeqCst) {
            return Err(StatusStoreError::Unavailable("store offline".to_string()));
        }
        self.inner.record_transition(asset_id, status).await
    }

    async fn get(&self, asset_id: &str) -> Result<Option<AssetStatusRecord>, StatusStoreError> {
        if self.slow_reads.load(Ordering::SeqCst) {
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
        }
        self.inner.get(asset_id).await
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub provider: Arc<FakeProvider>,
    pub store: Arc<RecordingStatusStore>,
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.mux.webhook_secret = Some(WEBHOOK_SECRET.to_string());
    config.mux.token_id = Some("token-id".to_string());
    config.mux.token_secret = Some("token-secret".to_string());
    config.status_updates.timeout_ms = 200;
    config.status_updates.retry_base_ms = 10;
    config.base.max_webhook_body_bytes = 64 * 1024;
    config
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(test_config(), FakeProvider::default()).await
}

pub async fn setup_test_app_with(config: Config, provider: FakeProvider) -> TestApp {
    let provider = Arc::new(provider);
    let store = Arc::new(RecordingStatusStore::default());
    let state = AppState::new(config.clone(), provider.clone(), store.clone());
    let router = setup_routes(&config, state).expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        provider,
        store,
    }
}

pub fn signature_header_name() -> HeaderName {
    HeaderName::from_static("mux-signature")
}

/// A valid `mux-signature` header for `body`.
pub fn sign(body: &str) -> HeaderValue {
    sign_with(WEBHOOK_SECRET, TIMESTAMP, body)
}

pub fn sign_with(secret: &str, timestamp: &str, body: &str) -> HeaderValue {
    HeaderValue::from_str(&signature_header(
        secret.as_bytes(),
        timestamp,
        body.as_bytes(),
    ))
    .expect("signature header is ASCII")
}

pub fn event_body(event_type: &str, asset_id: &str) -> String {
    serde_json::json!({
        "type": event_type,
        "object": { "type": "asset", "id": asset_id },
        "data": { "id": asset_id, "status": "preparing" }
    })
    .to_string()
}

pub fn ready_asset(id: &str, playback_id: &str, title: &str) -> Asset {
    Asset {
        id: id.to_string(),
        status: "ready".to_string(),
        playback_ids: vec![PlaybackId {
            id: playback_id.to_string(),
            policy: "public".to_string(),
        }],
        created_at: "1700000000".to_string(),
        duration: Some(12.0),
        title: title.to_string(),
        description: String::new(),
        thumbnail_url: None,
        stream_url: None,
        tracked_status: None,
    }
    .with_playback_urls()
}
