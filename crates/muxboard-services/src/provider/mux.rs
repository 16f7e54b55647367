//! Mux Video API client.
//!
//! Direct uploads, asset listing and deletion over the REST API with basic auth.

use async_trait::async_trait;
use muxboard_core::config::MuxConfig;
use muxboard_core::{Asset, Passthrough, PlaybackId, UploadTicket};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use super::{validate_asset_id, ProviderError, VideoProvider};

const UPLOADS_PATH: &str = "/video/v1/uploads";
const ASSETS_PATH: &str = "/video/v1/assets";
const META_FIELD_MAX_CHARS: usize = 128;

/// Configuration for the Mux client
#[derive(Clone, Debug)]
pub struct MuxServiceConfig {
    pub base_url: String,
    pub token_id: Option<String>,
    pub token_secret: Option<String>,
    pub upload_cors_origin: String,
    pub timeout_secs: u64,
}

impl From<&MuxConfig> for MuxServiceConfig {
    fn from(config: &MuxConfig) -> Self {
        Self {
            base_url: config.api_base_url.clone(),
            token_id: config.token_id.clone(),
            token_secret: config.token_secret.clone(),
            upload_cors_origin: config.upload_cors_origin.clone(),
            timeout_secs: config.timeout_secs,
        }
    }
}

#[derive(Clone)]
pub struct MuxService {
    client: reqwest::Client,
    base_url: String,
    credentials: Option<(String, String)>,
    upload_cors_origin: String,
}

// Request/response payloads

#[derive(Debug, Serialize)]
struct CreateUploadBody<'a> {
    cors_origin: &'a str,
    new_asset_settings: NewAssetSettings<'a>,
}

#[derive(Debug, Serialize)]
struct NewAssetSettings<'a> {
    playback_policy: [&'a str; 1],
    video_quality: &'a str,
    passthrough: String,
    meta: AssetMeta,
}

#[derive(Debug, Serialize)]
struct AssetMeta {
    title: String,
    creator_id: String,
    external_id: String,
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct MuxUpload {
    id: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct MuxAsset {
    id: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    playback_ids: Vec<PlaybackId>,
    #[serde(default)]
    created_at: String,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    passthrough: Option<String>,
}

impl From<MuxAsset> for Asset {
    fn from(raw: MuxAsset) -> Self {
        let passthrough = Passthrough::parse_lenient(raw.passthrough.as_deref());
        Asset {
            id: raw.id,
            status: raw.status,
            playback_ids: raw.playback_ids,
            created_at: raw.created_at,
            duration: raw.duration,
            title: passthrough.title,
            description: passthrough.description,
            thumbnail_url: None,
            stream_url: None,
            tracked_status: None,
        }
        .with_playback_urls()
    }
}

#[derive(Debug, Deserialize)]
struct MuxErrorEnvelope {
    error: MuxErrorBody,
}

#[derive(Debug, Deserialize)]
struct MuxErrorBody {
    #[serde(default, rename = "type")]
    error_type: Option<String>,
    #[serde(default)]
    messages: Vec<String>,
}

fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

impl MuxService {
    pub fn new(config: MuxServiceConfig) -> Result<Self, anyhow::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client for Mux: {}", e))?;

        let credentials = match (config.token_id, config.token_secret) {
            (Some(id), Some(secret)) => Some((id, secret)),
            _ => None,
        };

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
            upload_cors_origin: config.upload_cors_origin,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, ProviderError> {
        let (id, secret) = self
            .credentials
            .as_ref()
            .ok_or(ProviderError::NotConfigured)?;
        Ok(request.basic_auth(id, Some(secret)))
    }

    /// Turn a non-success response into `ProviderError::Api`, using Mux's error
    /// body when it has one.
    async fn error_from_response(response: reqwest::Response) -> ProviderError {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        let message = match serde_json::from_str::<MuxErrorEnvelope>(&text) {
            Ok(envelope) if !envelope.error.messages.is_empty() => {
                envelope.error.messages.join("; ")
            }
            Ok(envelope) => envelope
                .error
                .error_type
                .unwrap_or_else(|| "unknown error".to_string()),
            Err(_) if text.is_empty() => "empty response body".to_string(),
            Err(_) => text,
        };

        ProviderError::Api { status, message }
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ProviderError> {
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        let envelope: DataEnvelope<T> = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl VideoProvider for MuxService {
    #[tracing::instrument(skip_all, fields(title = %title))]
    async fn create_direct_upload(
        &self,
        title: &str,
        description: &str,
    ) -> Result<UploadTicket, ProviderError> {
        let body = CreateUploadBody {
            cors_origin: &self.upload_cors_origin,
            new_asset_settings: NewAssetSettings {
                playback_policy: ["public"],
                video_quality: "basic",
                passthrough: Passthrough::new(title, description).to_json_string(),
                meta: AssetMeta {
                    title: truncate_chars(title, META_FIELD_MAX_CHARS * 4),
                    creator_id: truncate_chars(description, META_FIELD_MAX_CHARS),
                    external_id: Uuid::new_v4().to_string(),
                },
            },
        };

        let request = self.authorized(self.client.post(self.url(UPLOADS_PATH)).json(&body))?;
        let response = request.send().await?;
        let upload: MuxUpload = Self::decode(response).await?;

        tracing::info!(upload_id = %upload.id, "Created direct upload");

        Ok(UploadTicket {
            id: upload.id,
            url: upload.url,
        })
    }

    #[tracing::instrument(skip(self))]
    async fn list_assets(&self, limit: u32) -> Result<Vec<Asset>, ProviderError> {
        let request = self.authorized(
            self.client
                .get(self.url(ASSETS_PATH))
                .query(&[("limit", limit.to_string())]),
        )?;
        let response = request.send().await?;
        let assets: Vec<MuxAsset> = Self::decode(response).await?;

        tracing::debug!(count = assets.len(), "Fetched assets");

        Ok(assets.into_iter().map(Asset::from).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_asset(&self, asset_id: &str) -> Result<(), ProviderError> {
        validate_asset_id(asset_id)?;

        let request =
            self.authorized(self.client.delete(self.url(&format!("{}/{}", ASSETS_PATH, asset_id))))?;
        let response = request.send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound(asset_id.to_string()));
        }
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        tracing::info!(asset_id = %asset_id, "Deleted asset");
        Ok(())
    }
}
