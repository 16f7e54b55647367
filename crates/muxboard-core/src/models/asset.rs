use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::AssetStatus;

pub const MUX_IMAGE_BASE_URL: &str = "https://image.mux.com";
pub const MUX_STREAM_BASE_URL: &str = "https://stream.mux.com";

/// Playback identifier attached to an asset by the provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct PlaybackId {
    pub id: String,
    pub policy: String,
}

/// Video asset as listed to clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Asset {
    pub id: String,
    /// Provider-side status string (e.g. "preparing", "ready", "errored").
    pub status: String,
    #[serde(default)]
    pub playback_ids: Vec<PlaybackId>,
    /// Creation time as reported by the provider (unix seconds, as a string).
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_url: Option<String>,
    /// Status last recorded from lifecycle events, when this process has seen one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracked_status: Option<AssetStatus>,
}

impl Asset {
    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }

    pub fn first_public_playback_id(&self) -> Option<&str> {
        self.playback_ids
            .iter()
            .find(|p| p.policy == "public")
            .map(|p| p.id.as_str())
    }

    /// Fill `thumbnail_url` and `stream_url` from the first public playback id
    /// once the asset is ready.
    pub fn with_playback_urls(mut self) -> Self {
        if !self.is_ready() {
            return self;
        }
        if let Some(playback_id) = self.first_public_playback_id().map(str::to_owned) {
            self.thumbnail_url = Some(format!(
                "{}/{}/thumbnail.jpg?time=0&width=320",
                MUX_IMAGE_BASE_URL, playback_id
            ));
            self.stream_url = Some(format!("{}/{}.m3u8", MUX_STREAM_BASE_URL, playback_id));
        }
        self
    }

    /// Duration as `m:ss`, if known.
    pub fn formatted_duration(&self) -> Option<String> {
        self.duration.map(|secs| {
            let total = secs.max(0.0).floor() as u64;
            format!("{}:{:02}", total / 60, total % 60)
        })
    }
}

/// Title and description carried through the provider's passthrough field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Passthrough {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl Passthrough {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Parse a passthrough string, falling back to empty fields when it is
    /// absent or was not written by us.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw {
            Some(raw) => serde_json::from_str(raw).unwrap_or_else(|e| {
                tracing::debug!(error = %e, "Ignoring unparseable asset passthrough");
                Self::default()
            }),
            None => Self::default(),
        }
    }
}

/// Request body for creating a direct upload.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUploadRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
}

/// Direct upload URL issued by the provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct UploadTicket {
    pub id: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(status: &str, playback_ids: Vec<PlaybackId>) -> Asset {
        Asset {
            id: "asset-1".to_string(),
            status: status.to_string(),
            playback_ids,
            created_at: "1700000000".to_string(),
            duration: Some(125.4),
            title: String::new(),
            description: String::new(),
            thumbnail_url: None,
            stream_url: None,
            tracked_status: None,
        }
    }

    #[test]
    fn test_playback_urls_for_ready_asset() {
        let asset = asset(
            "ready",
            vec![
                PlaybackId {
                    id: "signed-1".to_string(),
                    policy: "signed".to_string(),
                },
                PlaybackId {
                    id: "pub-1".to_string(),
                    policy: "public".to_string(),
                },
            ],
        )
        .with_playback_urls();

        assert_eq!(
            asset.thumbnail_url.as_deref(),
            Some("https://image.mux.com/pub-1/thumbnail.jpg?time=0&width=320")
        );
        assert_eq!(
            asset.stream_url.as_deref(),
            Some("https://stream.mux.com/pub-1.m3u8")
        );
    }

    #[test]
    fn test_no_playback_urls_while_preparing() {
        let asset = asset(
            "preparing",
            vec![PlaybackId {
                id: "pub-1".to_string(),
                policy: "public".to_string(),
            }],
        )
        .with_playback_urls();
        assert!(asset.thumbnail_url.is_none());
        assert!(asset.stream_url.is_none());
    }

    #[test]
    fn test_formatted_duration() {
        assert_eq!(
            asset("ready", vec![]).formatted_duration().as_deref(),
            Some("2:05")
        );
        let mut no_duration = asset("ready", vec![]);
        no_duration.duration = None;
        assert!(no_duration.formatted_duration().is_none());
    }

    #[test]
    fn test_passthrough_round_trip_and_fallback() {
        let raw = Passthrough::new("Holiday", "Beach day").to_json_string();
        assert_eq!(
            Passthrough::parse_lenient(Some(&raw)),
            Passthrough::new("Holiday", "Beach day")
        );
        assert_eq!(Passthrough::parse_lenient(Some("not-json")), Passthrough::default());
        assert_eq!(Passthrough::parse_lenient(None), Passthrough::default());
        assert_eq!(
            Passthrough::parse_lenient(Some(r#"{"title":"Only title"}"#)),
            Passthrough::new("Only title", "")
        );
    }

    #[test]
    fn test_create_upload_request_validation() {
        let ok = CreateUploadRequest {
            title: "Clip".to_string(),
            description: String::new(),
        };
        assert!(ok.validate().is_ok());

        let empty_title = CreateUploadRequest {
            title: String::new(),
            description: "desc".to_string(),
        };
        assert!(empty_title.validate().is_err());
    }
}
