//! HTTP client for the Muxboard API.
//!
//! Generic GET/POST/DELETE helpers plus domain methods (create upload, list
//! and delete assets) and the direct file upload to the provider's URL.
//! The CLI uses this client directly.

pub mod api;

use anyhow::{Context, Result};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// HTTP client for the Muxboard API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    upload_client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;

        // File uploads can run for a long time; only bound the connect phase.
        let upload_client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create upload HTTP client")?;

        Ok(Self {
            client,
            upload_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create client from environment: MUXBOARD_API_URL (or API_URL).
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("MUXBOARD_API_URL")
            .or_else(|_| std::env::var("API_URL"))
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET request with optional query parameters. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let mut request = self.client.get(self.build_url(path));
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await.context("Failed to send request")?;
        Self::json_body(response).await
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .client
            .post(self.build_url(path))
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;
        Self::json_body(response).await
    }

    /// DELETE request. Deserializes JSON response.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .client
            .delete(self.build_url(path))
            .send()
            .await
            .context("Failed to send request")?;
        Self::json_body(response).await
    }

    /// Raw client for custom requests.
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub(crate) fn upload_client(&self) -> &Client {
        &self.upload_client
    }

    pub(crate) async fn ensure_success(response: Response) -> Result<Response> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "API request failed with status {}: {}",
                status,
                error_text
            ));
        }
        Ok(response)
    }

    async fn json_body<T: DeserializeOwned>(response: Response) -> Result<T> {
        let response = Self::ensure_success(response).await?;
        let body: T = response
            .json()
            .await
            .context("Failed to parse response as JSON")?;
        Ok(body)
    }
}

// Re-export domain response types for convenience.
pub use api::DeleteAssetResponse;
pub use muxboard_core::models::{Asset, AssetStatus, PlaybackId, UploadTicket};
