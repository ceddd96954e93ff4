//! Handlers for insight and aggregate endpoints.

use axum::extract::{Query, State};
use axum::Json;
use chrono::Duration;
use serde::Deserialize;

use adlens_core::entities::{AssetKind, AssetStatus, Platform};
use adlens_core::insight::{CampaignSnapshot, Insight};
use adlens_core::query::AssetFilter;
use adlens_engine::{InsightSummary, TrendAlert};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Default trend window, in hours.
const DEFAULT_TREND_WINDOW_HOURS: i64 = 24;

/// Default score movement considered significant.
const DEFAULT_TREND_THRESHOLD: f64 = 0.5;

/// Query parameters for `GET /insights/summary`.
#[derive(Debug, Deserialize)]
pub struct SummaryParams {
    pub status: Option<AssetStatus>,
    pub platform: Option<Platform>,
    pub kind: Option<AssetKind>,
    pub name_contains: Option<String>,
}

/// Query parameters for `GET /insights/trend`.
#[derive(Debug, Deserialize)]
pub struct TrendParams {
    pub window_hours: Option<i64>,
    pub threshold: Option<f64>,
}

/// Request body for `POST /insights/campaigns`.
#[derive(Debug, Deserialize)]
pub struct CampaignInsightsRequest {
    pub campaigns: Vec<CampaignSnapshot>,
}

/// GET /api/v1/insights/summary
///
/// Cross-asset aggregates (average score, top platform/kind, status
/// distribution) over the assets matching the filter.
pub async fn summary(
    State(state): State<AppState>,
    Query(params): Query<SummaryParams>,
) -> AppResult<Json<DataResponse<InsightSummary>>> {
    let filter = AssetFilter {
        status: params.status,
        platform: params.platform,
        kind: params.kind,
        name_contains: params.name_contains,
    };
    let summary = state.aggregator.summary(&filter).await;
    Ok(Json(DataResponse::new(summary)))
}

/// GET /api/v1/insights/trend
///
/// Average-score movement between the two most recent windows, graded
/// into an alert severity. `data` is null until both windows have scores.
pub async fn trend(
    State(state): State<AppState>,
    Query(params): Query<TrendParams>,
) -> AppResult<Json<DataResponse<Option<TrendAlert>>>> {
    let window = Duration::hours(params.window_hours.unwrap_or(DEFAULT_TREND_WINDOW_HOURS));
    let threshold = params.threshold.unwrap_or(DEFAULT_TREND_THRESHOLD);
    let alert = state.aggregator.score_trend(window, threshold).await;
    Ok(Json(DataResponse::new(alert)))
}

/// POST /api/v1/insights/campaigns
///
/// Deterministic rules pass over caller-supplied campaign metrics.
pub async fn campaign_insights(
    State(state): State<AppState>,
    Json(body): Json<CampaignInsightsRequest>,
) -> AppResult<Json<DataResponse<Vec<Insight>>>> {
    let insights = state.aggregator.campaign_insights(&body.campaigns);
    Ok(Json(DataResponse::new(insights)))
}
