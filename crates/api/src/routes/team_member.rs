use axum::routing::get;
use axum::Router;

use crate::handlers::team_member;
use crate::state::AppState;

/// Routes mounted at `/team-members`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(team_member::list))
}
