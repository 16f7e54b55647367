//! OpenAPI documentation, served at `/api/openapi.json` and rendered at `/docs`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use muxboard_core::models;
use muxboard_services::StatusUpdateMetricsSnapshot;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Muxboard API",
        version = "0.1.0",
        description = "Upload videos to Mux, list and delete assets, and receive signed Mux lifecycle webhooks."
    ),
    paths(
        handlers::mux_webhook::receive_mux_webhook,
        handlers::uploads::create_upload,
        handlers::assets::list_assets,
        handlers::assets::delete_asset,
    ),
    components(
        schemas(
            models::Asset,
            models::AssetStatus,
            models::PlaybackId,
            models::CreateUploadRequest,
            models::UploadTicket,
            handlers::mux_webhook::WebhookAck,
            handlers::mux_webhook::WebhookErrorBody,
            handlers::assets::DeleteAssetResponse,
            StatusUpdateMetricsSnapshot,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "webhooks", description = "Signed lifecycle events from Mux"),
        (name = "uploads", description = "Direct upload URL provisioning"),
        (name = "assets", description = "Asset listing and deletion")
    )
)]
pub struct ApiDoc;
