use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use muxboard_core::{CreateUploadRequest, UploadTicket};
use std::sync::Arc;
use validator::Validate;

/// Create a direct upload URL. The client PUTs the file to `url`; the
/// resulting asset carries the title and description.
#[utoipa::path(
    post,
    path = "/api/uploads",
    tag = "uploads",
    request_body = CreateUploadRequest,
    responses(
        (status = 201, description = "Upload URL created", body = UploadTicket),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 502, description = "Provider error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all, fields(operation = "create_upload"))]
pub async fn create_upload(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateUploadRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;

    let ticket = state
        .provider
        .create_direct_upload(&request.title, &request.description)
        .await
        .map_err(|e| e.into_app_error("Failed to create upload URL"))?;

    tracing::info!(upload_id = %ticket.id, title = %request.title, "Upload URL created");

    Ok((StatusCode::CREATED, Json(ticket)))
}
