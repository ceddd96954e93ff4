//! Handlers for creative asset endpoints.
//!
//! Submission, retrieval, querying, re-analysis, and cancellation of
//! in-flight analysis.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use adlens_core::entities::{AssetDraft, AssetKind, AssetStatus, CreativeAsset, Platform};
use adlens_core::query::{AssetFilter, SortKey, SortOrder};
use adlens_core::types::EntityId;
use adlens_engine::query::query_assets;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /assets`.
#[derive(Debug, Deserialize)]
pub struct AssetListParams {
    pub status: Option<AssetStatus>,
    pub platform: Option<Platform>,
    pub kind: Option<AssetKind>,
    /// Case-insensitive substring match on the asset name.
    pub name_contains: Option<String>,
    pub sort_by: Option<SortKey>,
    /// Sort direction; defaults to ascending when `sort_by` is present.
    pub order: Option<SortOrder>,
}

impl AssetListParams {
    fn filter(&self) -> AssetFilter {
        AssetFilter {
            status: self.status,
            platform: self.platform,
            kind: self.kind,
            name_contains: self.name_contains.clone(),
        }
    }

    fn sort(&self) -> Option<(SortKey, SortOrder)> {
        self.sort_by
            .map(|key| (key, self.order.unwrap_or(SortOrder::Asc)))
    }
}

/// POST /api/v1/assets
///
/// Validate and create a new asset; analysis is enqueued out-of-band, so
/// the response carries the asset still in `pending_analysis`.
pub async fn submit_asset(
    State(state): State<AppState>,
    Json(draft): Json<AssetDraft>,
) -> AppResult<(StatusCode, Json<DataResponse<CreativeAsset>>)> {
    let asset = state.manager.submit_asset(draft).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(asset))))
}

/// GET /api/v1/assets
///
/// Filtered, optionally sorted snapshot of all assets.
pub async fn list_assets(
    State(state): State<AppState>,
    Query(params): Query<AssetListParams>,
) -> AppResult<Json<DataResponse<Vec<CreativeAsset>>>> {
    let assets = query_assets(state.manager.store(), &params.filter(), params.sort()).await;
    Ok(Json(DataResponse::new(assets)))
}

/// GET /api/v1/assets/{id}
pub async fn get_asset(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<CreativeAsset>>> {
    let asset = state
        .manager
        .store()
        .get_asset(id)
        .await
        .ok_or(AppError::Core(adlens_core::error::CoreError::NotFound {
            entity: "asset",
            id,
        }))?;
    Ok(Json(DataResponse::new(asset)))
}

/// POST /api/v1/assets/{id}/reanalyze
///
/// Reset a scored or failed asset to `pending_analysis` and re-enqueue it.
pub async fn reanalyze_asset(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<CreativeAsset>>> {
    let asset = state.manager.reanalyze(id).await?;
    Ok(Json(DataResponse::new(asset)))
}

/// POST /api/v1/assets/{id}/cancel
///
/// Cancel the in-flight analysis for an asset. The asset lands in `failed`
/// with a cancellation reason once the task observes the token.
pub async fn cancel_analysis(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<serde_json::Value>>> {
    state.manager.cancel_analysis(id).await?;
    Ok(Json(DataResponse::new(
        serde_json::json!({ "cancelled": true }),
    )))
}
