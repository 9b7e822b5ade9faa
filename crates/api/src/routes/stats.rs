//! Route definitions for dashboard statistics.

use axum::routing::get;
use axum::Router;

use crate::handlers::stats;
use crate::state::AppState;

/// Routes mounted at `/stats`.
///
/// ```text
/// GET /projects   -> project_stats
/// GET /clients    -> client_stats
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/projects", get(stats::project_stats))
        .route("/clients", get(stats::client_stats))
}
