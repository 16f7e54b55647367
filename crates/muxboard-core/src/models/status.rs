use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;

pub const EVENT_ASSET_CREATED: &str = "video.asset.created";
pub const EVENT_ASSET_READY: &str = "video.asset.ready";
pub const EVENT_ASSET_ERRORED: &str = "video.asset.errored";

/// Internal status vocabulary for an asset, derived from provider event types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    Processing,
    Ready,
    Error,
    Unknown,
}

impl AssetStatus {
    /// Map a provider event type through the fixed translation table.
    pub fn from_event_type(event_type: &str) -> Self {
        match event_type {
            EVENT_ASSET_CREATED => AssetStatus::Processing,
            EVENT_ASSET_READY => AssetStatus::Ready,
            EVENT_ASSET_ERRORED => AssetStatus::Error,
            _ => AssetStatus::Unknown,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, AssetStatus::Ready | AssetStatus::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AssetStatus::Processing => "processing",
            AssetStatus::Ready => "ready",
            AssetStatus::Error => "error",
            AssetStatus::Unknown => "unknown",
        }
    }

    /// Position in the lifecycle `processing -> ready | error`.
    fn stage(self) -> u8 {
        match self {
            AssetStatus::Unknown => 0,
            AssetStatus::Processing => 1,
            AssetStatus::Ready | AssetStatus::Error => 2,
        }
    }

    /// Decide what recording `next` on top of `current` does.
    ///
    /// Status only moves forward; terminal states are final, and `Unknown`
    /// never changes anything.
    pub fn check_transition(current: Option<AssetStatus>, next: AssetStatus) -> TransitionOutcome {
        if next == AssetStatus::Unknown {
            return TransitionOutcome::Ignored {
                current: current.unwrap_or(AssetStatus::Unknown),
            };
        }

        match current {
            None => TransitionOutcome::Applied { previous: None },
            Some(current) if current == next => TransitionOutcome::Unchanged,
            Some(current) if current.is_terminal() => TransitionOutcome::Ignored { current },
            Some(current) if next.stage() > current.stage() => TransitionOutcome::Applied {
                previous: Some(current),
            },
            Some(current) => TransitionOutcome::Ignored { current },
        }
    }
}

impl Display for AssetStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(AssetStatus::Processing),
            "ready" => Ok(AssetStatus::Ready),
            "error" => Ok(AssetStatus::Error),
            "unknown" => Ok(AssetStatus::Unknown),
            _ => Err(anyhow::anyhow!("Invalid asset status: {}", s)),
        }
    }
}

/// Result of applying a status transition to a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TransitionOutcome {
    /// The new status was written.
    Applied { previous: Option<AssetStatus> },
    /// The asset already had this status.
    Unchanged,
    /// The transition would move the lifecycle backwards and was dropped.
    Ignored { current: AssetStatus },
}

/// Last known status of an asset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct AssetStatusRecord {
    pub asset_id: String,
    pub status: AssetStatus,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_mapping() {
        assert_eq!(
            AssetStatus::from_event_type("video.asset.created"),
            AssetStatus::Processing
        );
        assert_eq!(
            AssetStatus::from_event_type("video.asset.ready"),
            AssetStatus::Ready
        );
        assert_eq!(
            AssetStatus::from_event_type("video.asset.errored"),
            AssetStatus::Error
        );
        assert_eq!(
            AssetStatus::from_event_type("video.asset.deleted"),
            AssetStatus::Unknown
        );
        assert_eq!(AssetStatus::from_event_type(""), AssetStatus::Unknown);
        assert_eq!(
            AssetStatus::from_event_type("VIDEO.ASSET.READY"),
            AssetStatus::Unknown
        );
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&AssetStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
        let parsed: AssetStatus = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(parsed, AssetStatus::Error);
        assert_eq!("ready".parse::<AssetStatus>().unwrap(), AssetStatus::Ready);
        assert!("done".parse::<AssetStatus>().is_err());
    }

    #[test]
    fn test_first_transition_is_applied() {
        assert_eq!(
            AssetStatus::check_transition(None, AssetStatus::Ready),
            TransitionOutcome::Applied { previous: None }
        );
    }

    #[test]
    fn test_forward_transition_is_applied() {
        assert_eq!(
            AssetStatus::check_transition(Some(AssetStatus::Processing), AssetStatus::Ready),
            TransitionOutcome::Applied {
                previous: Some(AssetStatus::Processing)
            }
        );
        assert_eq!(
            AssetStatus::check_transition(Some(AssetStatus::Processing), AssetStatus::Error),
            TransitionOutcome::Applied {
                previous: Some(AssetStatus::Processing)
            }
        );
    }

    #[test]
    fn test_backward_transition_is_ignored() {
        assert_eq!(
            AssetStatus::check_transition(Some(AssetStatus::Ready), AssetStatus::Processing),
            TransitionOutcome::Ignored {
                current: AssetStatus::Ready
            }
        );
    }

    #[test]
    fn test_terminal_states_are_final() {
        assert_eq!(
            AssetStatus::check_transition(Some(AssetStatus::Ready), AssetStatus::Error),
            TransitionOutcome::Ignored {
                current: AssetStatus::Ready
            }
        );
        assert_eq!(
            AssetStatus::check_transition(Some(AssetStatus::Error), AssetStatus::Ready),
            TransitionOutcome::Ignored {
                current: AssetStatus::Error
            }
        );
    }

    #[test]
    fn test_repeated_status_is_unchanged() {
        assert_eq!(
            AssetStatus::check_transition(Some(AssetStatus::Ready), AssetStatus::Ready),
            TransitionOutcome::Unchanged
        );
    }

    #[test]
    fn test_unknown_never_moves_state() {
        assert_eq!(
            AssetStatus::check_transition(None, AssetStatus::Unknown),
            TransitionOutcome::Ignored {
                current: AssetStatus::Unknown
            }
        );
        assert_eq!(
            AssetStatus::check_transition(Some(AssetStatus::Processing), AssetStatus::Unknown),
            TransitionOutcome::Ignored {
                current: AssetStatus::Processing
            }
        );
    }
}
