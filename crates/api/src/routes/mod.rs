pub mod assets;
pub mod health;
pub mod insights;
pub mod recommendations;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /assets                          GET list, POST submit
/// /assets/{id}                     GET
/// /assets/{id}/reanalyze           POST
/// /assets/{id}/cancel              POST
/// /recommendations                 GET list, POST submit
/// /recommendations/{id}            GET
/// /recommendations/{id}/resolve    POST
/// /insights/summary                GET
/// /insights/trend                  GET
/// /insights/campaigns              POST
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/assets", assets::router())
        .nest("/recommendations", recommendations::router())
        .nest("/insights", insights::router())
}
