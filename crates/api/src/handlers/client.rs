//! Handlers for the `/clients` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use crm_core::types::DbId;
use crm_db::models::client::{Client, ClientWithDocumentCount};
use crm_db::models::project::ProjectWithAssignee;
use serde::Deserialize;
use serde_json::Value;

use crate::error::AppResult;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ClientListParams {
    pub status: Option<String>,
}

/// GET /api/clients
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ClientListParams>,
) -> AppResult<Json<Vec<ClientWithDocumentCount>>> {
    let clients = state.domain.list_clients(params.status.as_deref()).await?;
    Ok(Json(clients))
}

/// GET /api/clients/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ClientWithDocumentCount>> {
    let client = state.domain.get_client(id).await?;
    Ok(Json(client))
}

/// POST /api/clients
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> AppResult<(StatusCode, Json<Client>)> {
    let client = state.domain.create_client(&body).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

/// PATCH /api/clients/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<Value>,
) -> AppResult<Json<Client>> {
    let client = state.domain.update_client(id, &body).await?;
    Ok(Json(client))
}

/// DELETE /api/clients/{id}
///
/// Removes the client's documents (rows and files) and projects as well.
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    state.domain.delete_client(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/clients/{id}/projects
pub async fn list_projects(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<ProjectWithAssignee>>> {
    let projects = state.domain.list_projects_by_client(id).await?;
    Ok(Json(projects))
}
