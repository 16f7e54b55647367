use async_trait::async_trait;
use chrono::Utc;
use muxboard_core::{AssetStatus, AssetStatusRecord, TransitionOutcome};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, thiserror::Error)]
pub enum StatusStoreError {
    #[error("status store unavailable: {0}")]
    Unavailable(String),
}

/// Storage for the last known status of each asset.
///
/// Implementations must apply `AssetStatus::check_transition` atomically with
/// the write, so replays and out-of-order deliveries cannot move an asset
/// backwards.
#[async_trait]
pub trait AssetStatusStore: Send + Sync {
    async fn record_transition(
        &self,
        asset_id: &str,
        status: AssetStatus,
    ) -> Result<TransitionOutcome, StatusStoreError>;

    async fn get(&self, asset_id: &str) -> Result<Option<AssetStatusRecord>, StatusStoreError>;
}

/// Process-local store. Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryAssetStatusStore {
    records: RwLock<HashMap<String, AssetStatusRecord>>,
}

impl InMemoryAssetStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl AssetStatusStore for InMemoryAssetStatusStore {
    async fn record_transition(
        &self,
        asset_id: &str,
        status: AssetStatus,
    ) -> Result<TransitionOutcome, StatusStoreError> {
        let mut records = self.records.write().await;
        let current = records.get(asset_id).map(|r| r.status);
        let outcome = AssetStatus::check_transition(current, status);

        if let TransitionOutcome::Applied { .. } = outcome {
            records.insert(
                asset_id.to_string(),
                AssetStatusRecord {
                    asset_id: asset_id.to_string(),
                    status,
                    updated_at: Utc::now(),
                },
            );
        }

        Ok(outcome)
    }

    async fn get(&self, asset_id: &str) -> Result<Option<AssetStatusRecord>, StatusStoreError> {
        Ok(self.records.read().await.get(asset_id).cloned())
    }
}
