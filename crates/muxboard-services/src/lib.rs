//! Muxboard Services Library
//!
//! Outbound calls to the video provider and the asset status persistence path
//! fed by inbound lifecycle events.

pub mod provider;
pub mod status;

pub use provider::{validate_asset_id, MuxService, MuxServiceConfig, ProviderError, VideoProvider};
pub use status::{
    AssetStatusStore, InMemoryAssetStatusStore, StatusStoreError, StatusUpdateMetricsSnapshot,
    StatusUpdateOutcome, StatusUpdateService, StatusUpdateServiceConfig,
};
