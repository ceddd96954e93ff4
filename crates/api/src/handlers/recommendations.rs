//! Handlers for campaign recommendation endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use adlens_core::entities::{
    Impact, Recommendation, RecommendationCategory, RecommendationDraft, RecommendationStatus,
    Resolution,
};
use adlens_core::query::{RecommendationFilter, SortKey, SortOrder};
use adlens_core::types::EntityId;
use adlens_engine::query::query_recommendations;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /recommendations`.
#[derive(Debug, Deserialize)]
pub struct RecommendationListParams {
    pub status: Option<RecommendationStatus>,
    pub category: Option<RecommendationCategory>,
    pub impact: Option<Impact>,
    /// Case-insensitive substring match on the recommendation title.
    pub title_contains: Option<String>,
    pub sort_by: Option<SortKey>,
    pub order: Option<SortOrder>,
}

impl RecommendationListParams {
    fn filter(&self) -> RecommendationFilter {
        RecommendationFilter {
            status: self.status,
            category: self.category,
            impact: self.impact,
            title_contains: self.title_contains.clone(),
        }
    }

    fn sort(&self) -> Option<(SortKey, SortOrder)> {
        self.sort_by
            .map(|key| (key, self.order.unwrap_or(SortOrder::Asc)))
    }
}

/// Request body for `POST /recommendations/{id}/resolve`.
#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub outcome: Resolution,
}

/// POST /api/v1/recommendations
pub async fn submit_recommendation(
    State(state): State<AppState>,
    Json(draft): Json<RecommendationDraft>,
) -> AppResult<(StatusCode, Json<DataResponse<Recommendation>>)> {
    let rec = state.manager.submit_recommendation(draft).await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(rec))))
}

/// GET /api/v1/recommendations
pub async fn list_recommendations(
    State(state): State<AppState>,
    Query(params): Query<RecommendationListParams>,
) -> AppResult<Json<DataResponse<Vec<Recommendation>>>> {
    let recs =
        query_recommendations(state.manager.store(), &params.filter(), params.sort()).await;
    Ok(Json(DataResponse::new(recs)))
}

/// GET /api/v1/recommendations/{id}
pub async fn get_recommendation(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<Json<DataResponse<Recommendation>>> {
    let rec = state
        .manager
        .store()
        .get_recommendation(id)
        .await
        .ok_or(AppError::Core(adlens_core::error::CoreError::NotFound {
            entity: "recommendation",
            id,
        }))?;
    Ok(Json(DataResponse::new(rec)))
}

/// POST /api/v1/recommendations/{id}/resolve
///
/// Resolve a pending recommendation to `implemented` or `rejected`.
/// Recommendations resolve at most once; a second attempt returns 409.
pub async fn resolve_recommendation(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(body): Json<ResolveRequest>,
) -> AppResult<Json<DataResponse<Recommendation>>> {
    let rec = state
        .manager
        .resolve_recommendation(id, body.outcome)
        .await?;
    Ok(Json(DataResponse::new(rec)))
}
