//! Inbound Mux webhook receiver.
//!
//! The signature is checked against the raw body before anything else is
//! done with the request. Rejections use a fixed `{"error": ...}` body rather
//! than `ErrorResponse` because the sender only inspects the status code.

use crate::state::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use muxboard_core::{AssetStatus, InboundEvent};
use muxboard_infra::webhook::SIGNATURE_HEADER;
use muxboard_services::StatusUpdateOutcome;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookAck {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookRejection {
    InvalidSignature,
    InvalidJson,
}

impl IntoResponse for WebhookRejection {
    fn into_response(self) -> Response {
        let message = match self {
            WebhookRejection::InvalidSignature => "Invalid signature",
            WebhookRejection::InvalidJson => "Invalid JSON",
        };
        (
            StatusCode::BAD_REQUEST,
            Json(WebhookErrorBody {
                error: message.to_string(),
            }),
        )
            .into_response()
    }
}

#[utoipa::path(
    post,
    path = "/api/mux",
    tag = "webhooks",
    params(
        ("mux-signature" = String, Header, description = "t=<unix seconds>,v1=<hex HMAC-SHA256>")
    ),
    request_body(content = String, description = "Raw Mux event JSON", content_type = "application/json"),
    responses(
        (status = 200, description = "Event accepted", body = WebhookAck),
        (status = 400, description = "Invalid signature or invalid JSON", body = WebhookErrorBody),
        (status = 413, description = "Body too large")
    )
)]
#[tracing::instrument(
    skip_all,
    fields(
        event_type = tracing::field::Empty,
        asset_id = tracing::field::Empty,
        status = tracing::field::Empty,
        operation = "receive_mux_webhook"
    )
)]
pub async fn receive_mux_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, WebhookRejection> {
    // A non-UTF-8 header value is treated as present but malformed.
    let signature = headers
        .get(SIGNATURE_HEADER)
        .map(|value| value.to_str().unwrap_or_default());

    if let Err(e) = state.verifier.verify(signature, &body) {
        if e.is_misconfiguration() {
            tracing::error!(error = %e, "Webhook rejected: signing secret is not configured");
        } else {
            tracing::warn!(error = %e, "Webhook rejected: signature verification failed");
        }
        return Err(WebhookRejection::InvalidSignature);
    }

    let event = InboundEvent::parse(&body).map_err(|e| {
        tracing::warn!(error = %e, body_len = body.len(), "Webhook rejected: body is not JSON");
        WebhookRejection::InvalidJson
    })?;

    let status = event.status();
    let span = tracing::Span::current();
    span.record("event_type", event.event_type.as_str());
    span.record("status", status.as_str());

    match (event.asset_id(), status) {
        (None, _) => {
            tracing::info!("Webhook received without an asset id, nothing to record");
        }
        (Some(asset_id), AssetStatus::Unknown) => {
            span.record("asset_id", asset_id);
            tracing::info!("Webhook received for an unhandled event type");
        }
        (Some(asset_id), status) => {
            span.record("asset_id", asset_id);
            log_outcome(state.status_updates.apply(asset_id, status).await);
        }
    }

    Ok(Json(WebhookAck {
        message: "Webhook received".to_string(),
    }))
}

fn log_outcome(outcome: StatusUpdateOutcome) {
    match outcome {
        StatusUpdateOutcome::Applied { previous } => {
            tracing::info!(previous = ?previous, "Asset status updated");
        }
        StatusUpdateOutcome::Unchanged => {
            tracing::debug!("Asset status unchanged (duplicate delivery)");
        }
        StatusUpdateOutcome::Ignored { current } => {
            tracing::info!(current = %current, "Out-of-order event ignored");
        }
        StatusUpdateOutcome::Skipped => {
            tracing::debug!("No status to record");
        }
        StatusUpdateOutcome::Enqueued => {
            tracing::error!("Status update failed, enqueued for retry");
        }
        StatusUpdateOutcome::Dropped => {
            tracing::error!("Status update failed and could not be enqueued");
        }
    }
}
