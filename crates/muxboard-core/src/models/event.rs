use serde::Serialize;
use serde_json::Value;

use super::AssetStatus;

/// Payload of an inbound lifecycle event, decoded once per request.
///
/// Extraction is lenient: a JSON document that is not an object, or that lacks
/// `type` / `data.id`, still decodes (with empty type or no asset id) so that
/// the provider gets an acknowledgment instead of retrying forever.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InboundEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventData {
    pub id: Option<String>,
}

impl InboundEvent {
    /// Decode raw body bytes. Fails only when the bytes are not JSON.
    pub fn parse(body: &[u8]) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_slice(body)?;
        Ok(Self::from_value(&value))
    }

    pub fn from_value(value: &Value) -> Self {
        let event_type = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let id = value
            .get("data")
            .and_then(|data| data.get("id"))
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        Self {
            event_type,
            data: EventData { id },
        }
    }

    pub fn asset_id(&self) -> Option<&str> {
        self.data.id.as_deref()
    }

    pub fn status(&self) -> AssetStatus {
        AssetStatus::from_event_type(&self.event_type)
    }
}
