//! Route definitions for the `/assets` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::assets;
use crate::state::AppState;

/// Routes mounted at `/assets`.
///
/// ```text
/// GET    /                  -> list_assets
/// POST   /                  -> submit_asset
/// GET    /{id}              -> get_asset
/// POST   /{id}/reanalyze    -> reanalyze_asset
/// POST   /{id}/cancel       -> cancel_analysis
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(assets::list_assets).post(assets::submit_asset))
        .route("/{id}", get(assets::get_asset))
        .route("/{id}/reanalyze", post(assets::reanalyze_asset))
        .route("/{id}/cancel", post(assets::cancel_analysis))
}
