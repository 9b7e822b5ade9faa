//! Dashboard statistics handlers.

use axum::extract::State;
use axum::Json;
use crm_core::stats::{ClientStats, ProjectStats};

use crate::error::AppResult;
use crate::state::AppState;

/// GET /api/stats/projects
pub async fn project_stats(State(state): State<AppState>) -> AppResult<Json<ProjectStats>> {
    Ok(Json(state.domain.project_stats().await?))
}

/// GET /api/stats/clients
pub async fn client_stats(State(state): State<AppState>) -> AppResult<Json<ClientStats>> {
    Ok(Json(state.domain.client_stats().await?))
}
