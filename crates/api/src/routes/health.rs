use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Number of assets currently held by the entity store.
    pub assets: usize,
    /// Number of recommendations currently held by the entity store.
    pub recommendations: usize,
}

/// GET /health -- returns service status and store counts.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = state.manager.store();
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        assets: store.asset_count().await,
        recommendations: store.recommendation_count().await,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
