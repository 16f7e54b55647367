//! Domain methods for the Muxboard API client.

use crate::ApiClient;
use anyhow::{Context, Result};
use futures::StreamExt;
use muxboard_core::models::{Asset, CreateUploadRequest, UploadTicket};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

/// Response of `DELETE /api/assets/{id}`.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct DeleteAssetResponse {
    pub success: bool,
}

impl ApiClient {
    /// Ask the server for a direct upload URL.
    pub async fn create_upload(&self, title: &str, description: &str) -> Result<UploadTicket> {
        let request = CreateUploadRequest {
            title: title.to_string(),
            description: description.to_string(),
        };
        self.post_json("/api/uploads", &request)
            .await
            .context("Failed to create upload URL")
    }

    pub async fn list_assets(&self, limit: Option<u32>) -> Result<Vec<Asset>> {
        let query: Vec<(&str, String)> = limit
            .map(|l| vec![("limit", l.to_string())])
            .unwrap_or_default();
        self.get("/api/assets", &query)
            .await
            .context("Failed to fetch assets")
    }

    pub async fn delete_asset(&self, asset_id: &str) -> Result<DeleteAssetResponse> {
        if !is_path_safe_id(asset_id) {
            anyhow::bail!("Invalid asset ID: {:?}", asset_id);
        }
        self.delete(&format!("/api/assets/{}", asset_id))
            .await
            .context("Failed to delete asset")
    }

    /// Stream a local file to a direct upload URL with `PUT`, calling
    /// `on_progress(sent, total)` as chunks go out.
    pub async fn upload_file<F>(
        &self,
        upload_url: &str,
        file_path: &Path,
        on_progress: F,
    ) -> Result<()>
    where
        F: Fn(u64, u64) + Send + Sync + 'static,
    {
        let file = tokio::fs::File::open(file_path)
            .await
            .with_context(|| format!("Failed to open file: {}", file_path.display()))?;
        let total = file
            .metadata()
            .await
            .with_context(|| format!("Failed to read file metadata: {}", file_path.display()))?
            .len();

        let sent = Arc::new(AtomicU64::new(0));
        let on_progress = Arc::new(on_progress);
        let stream = ReaderStream::new(file).map(move |chunk| {
            if let Ok(bytes) = &chunk {
                let len = bytes.len() as u64;
                let so_far = sent.fetch_add(len, Ordering::Relaxed) + len;
                on_progress(so_far, total);
            }
            chunk
        });

        let response = self
            .upload_client()
            .put(upload_url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .header(reqwest::header::CONTENT_LENGTH, total)
            .body(reqwest::Body::wrap_stream(stream))
            .send()
            .await
            .context("Failed to upload file")?;

        Self::ensure_success(response)
            .await
            .context("Upload rejected by storage")?;
        Ok(())
    }
}

/// Ids go straight into the URL path, so only the provider's id alphabet is sent.
fn is_path_safe_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
