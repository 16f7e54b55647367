//! Asset status persistence
//!
//! Inbound lifecycle events are recorded through `StatusUpdateService`, which
//! bounds each write with a timeout and hands failed writes to a background
//! retry worker so the webhook acknowledgement never waits on storage.

mod service;
mod store;

pub use service::{
    StatusUpdateMetricsSnapshot, StatusUpdateOutcome, StatusUpdateService,
    StatusUpdateServiceConfig,
};
pub use store::{AssetStatusStore, InMemoryAssetStatusStore, StatusStoreError};
