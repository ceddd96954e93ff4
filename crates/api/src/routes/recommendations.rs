//! Route definitions for the `/recommendations` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::recommendations;
use crate::state::AppState;

/// Routes mounted at `/recommendations`.
///
/// ```text
/// GET    /                -> list_recommendations
/// POST   /                -> submit_recommendation
/// GET    /{id}            -> get_recommendation
/// POST   /{id}/resolve    -> resolve_recommendation
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(recommendations::list_recommendations).post(recommendations::submit_recommendation),
        )
        .route("/{id}", get(recommendations::get_recommendation))
        .route("/{id}/resolve", post(recommendations::resolve_recommendation))
}
