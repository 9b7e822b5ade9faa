use axum::extract::State;
use axum::Json;
use crm_db::models::team_member::TeamMember;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /api/team-members
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<TeamMember>>> {
    let members = state.domain.list_team_members().await?;
    Ok(Json(members))
}
