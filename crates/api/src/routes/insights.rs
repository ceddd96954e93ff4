//! Route definitions for the `/insights` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::insights;
use crate::state::AppState;

/// Routes mounted at `/insights`.
///
/// ```text
/// GET    /summary      -> summary
/// GET    /trend        -> trend
/// POST   /campaigns    -> campaign_insights
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/summary", get(insights::summary))
        .route("/trend", get(insights::trend))
        .route("/campaigns", post(insights::campaign_insights))
}
