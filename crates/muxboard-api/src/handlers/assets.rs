use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use muxboard_core::Asset;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

const MAX_LIST_LIMIT: u32 = 100;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListAssetsQuery {
    /// Number of assets to return (1-100, defaults to ASSET_LIST_LIMIT)
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteAssetResponse {
    pub success: bool,
}

#[utoipa::path(
    get,
    path = "/api/assets",
    tag = "assets",
    params(ListAssetsQuery),
    responses(
        (status = 200, description = "Most recent assets", body = Vec<Asset>),
        (status = 502, description = "Provider error", body = ErrorResponse),
        (status = 503, description = "Provider unreachable", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "list_assets"))]
pub async fn list_assets(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListAssetsQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let limit = query
        .limit
        .unwrap_or(state.config.base.asset_list_limit)
        .clamp(1, MAX_LIST_LIMIT);

    let assets = state
        .provider
        .list_assets(limit)
        .await
        .map_err(|e| e.into_app_error("Failed to fetch assets"))?;

    let ids: Vec<&str> = assets.iter().map(|asset| asset.id.as_str()).collect();
    let statuses = state.status_updates.current_statuses(&ids).await;

    let response: Vec<Asset> = assets
        .into_iter()
        .zip(statuses)
        .map(|(mut asset, status)| {
            asset.tracked_status = status;
            asset
        })
        .collect();

    Ok(Json(response))
}

#[utoipa::path(
    delete,
    path = "/api/assets/{id}",
    tag = "assets",
    params(
        ("id" = String, Path, description = "Asset ID")
    ),
    responses(
        (status = 200, description = "Asset deleted", body = DeleteAssetResponse),
        (status = 400, description = "Invalid asset ID", body = ErrorResponse),
        (status = 404, description = "Asset not found", body = ErrorResponse),
        (status = 502, description = "Provider error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(asset_id = %id, operation = "delete_asset"))]
pub async fn delete_asset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    state
        .provider
        .delete_asset(&id)
        .await
        .map_err(|e| e.into_app_error("Failed to delete asset"))?;

    tracing::info!("Asset deleted");

    Ok(Json(DeleteAssetResponse { success: true }))
}
