//! Video provider abstraction.
//!
//! Handlers talk to `dyn VideoProvider` so the concrete Mux client can be
//! swapped for a fake in tests.

mod mux;

use async_trait::async_trait;
use muxboard_core::{AppError, Asset, UploadTicket};

pub use mux::{MuxService, MuxServiceConfig};

const MAX_ASSET_ID_LEN: usize = 128;

/// Provider operation errors
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider credentials are not configured")]
    NotConfigured,

    #[error("invalid asset id: {0}")]
    InvalidAssetId(String),

    #[error("asset not found: {0}")]
    NotFound(String),

    #[error("request to provider failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected provider response: {0}")]
    Decode(String),
}

impl ProviderError {
    /// Convert into an `AppError`, prefixing the provider message with the
    /// operation that failed (e.g. "Failed to fetch assets").
    pub fn into_app_error(self, operation: &str) -> AppError {
        match self {
            ProviderError::NotConfigured => AppError::Configuration(self.to_string()),
            ProviderError::InvalidAssetId(_) => AppError::InvalidInput(self.to_string()),
            ProviderError::NotFound(id) => AppError::NotFound(format!("Asset not found: {}", id)),
            ProviderError::Transport(ref e) if e.is_timeout() || e.is_connect() => {
                AppError::ProviderUnavailable(format!("{}: {}", operation, self))
            }
            other => AppError::Provider(format!("{}: {}", operation, other)),
        }
    }
}

/// Operations the application needs from the video hosting provider.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    /// Create a direct upload URL; the asset created from it carries `title`
    /// and `description` in its passthrough.
    async fn create_direct_upload(
        &self,
        title: &str,
        description: &str,
    ) -> Result<UploadTicket, ProviderError>;

    /// Most recent assets, newest first, at most `limit`.
    async fn list_assets(&self, limit: u32) -> Result<Vec<Asset>, ProviderError>;

    async fn delete_asset(&self, asset_id: &str) -> Result<(), ProviderError>;
}

/// Asset ids are opaque, but they end up in URL paths.
pub fn validate_asset_id(asset_id: &str) -> Result<(), ProviderError> {
    let valid = !asset_id.is_empty()
        && asset_id.len() <= MAX_ASSET_ID_LEN
        && asset_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ProviderError::InvalidAssetId(asset_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use muxboard_core::ErrorMetadata;

    #[test]
    fn test_validate_asset_id() {
        assert!(validate_asset_id("Zq01abCDef02_-x").is_ok());
        assert!(validate_asset_id("").is_err());
        assert!(validate_asset_id("../uploads").is_err());
        assert!(validate_asset_id("a b").is_err());
        assert!(validate_asset_id(&"a".repeat(129)).is_err());
    }

    #[test]
    fn test_into_app_error_prefixes_operation() {
        let err = ProviderError::Api {
            status: 500,
            message: "boom".to_string(),
        }
        .into_app_error("Failed to fetch assets");
        assert_eq!(err.http_status_code(), 502);
        assert_eq!(
            err.client_message(),
            "Failed to fetch assets: provider returned 500: boom"
        );
    }

    #[test]
    fn test_into_app_error_maps_kinds() {
        assert_eq!(
            ProviderError::NotFound("a1".to_string())
                .into_app_error("Failed to delete asset")
                .http_status_code(),
            404
        );
        assert_eq!(
            ProviderError::InvalidAssetId("a/1".to_string())
                .into_app_error("Failed to delete asset")
                .http_status_code(),
            400
        );
        assert_eq!(
            ProviderError::NotConfigured
                .into_app_error("Failed to create upload URL")
                .error_code(),
            "CONFIGURATION_ERROR"
        );
    }

    #[test]
    fn test_provider_auth_failure_is_a_gateway_error() {
        let err = ProviderError::Api {
            status: 401,
            message: "Unauthorized request".to_string(),
        }
        .into_app_error("Failed to fetch assets");
        assert_eq!(err.http_status_code(), 502);
        assert_eq!(err.error_code(), "PROVIDER_ERROR");
        assert_eq!(err.error_type(), "Provider");
    }
}
