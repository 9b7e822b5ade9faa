//! Handlers for the `/projects` resource.
//!
//! Bodies are taken as raw JSON and normalized by the domain layer, so loose
//! client input (string ids, boolean invoice flags, odd dates) is accepted.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use crm_core::filters::{ProjectFilter, ProjectQuery};
use crm_core::types::DbId;
use crm_db::models::project::{Project, ProjectWithAssignee};
use serde::Deserialize;
use serde_json::Value;

use crate::error::AppResult;
use crate::state::AppState;

/// Query parameters for `GET /projects`. `all` or empty means "any".
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListParams {
    pub status: Option<String>,
    pub assigned_to: Option<String>,
    #[serde(rename = "type")]
    pub project_type: Option<String>,
    pub last_contacted: Option<String>,
}

impl From<ProjectListParams> for ProjectQuery {
    fn from(params: ProjectListParams) -> Self {
        Self {
            status: params.status,
            assigned_to: params.assigned_to,
            project_type: params.project_type,
            last_contacted: params.last_contacted,
        }
    }
}

/// GET /api/projects
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ProjectListParams>,
) -> AppResult<Json<Vec<ProjectWithAssignee>>> {
    let filter = ProjectFilter::try_from(ProjectQuery::from(params))?;
    let projects = state.domain.list_projects(&filter).await?;
    Ok(Json(projects))
}

/// GET /api/projects/affiliate/{partner}
pub async fn list_by_affiliate_partner(
    State(state): State<AppState>,
    Path(partner): Path<String>,
) -> AppResult<Json<Vec<ProjectWithAssignee>>> {
    let projects = state.domain.list_projects_by_affiliate_partner(&partner).await?;
    Ok(Json(projects))
}

/// GET /api/projects/other/{category}
pub async fn list_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> AppResult<Json<Vec<ProjectWithAssignee>>> {
    let projects = state.domain.list_projects_by_category(&category).await?;
    Ok(Json(projects))
}

/// GET /api/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Project>> {
    let project = state.domain.get_project(id).await?;
    Ok(Json(project))
}

/// POST /api/projects
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> AppResult<(StatusCode, Json<Project>)> {
    let project = state.domain.create_project(&body).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// PATCH /api/projects/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<Value>,
) -> AppResult<Json<Project>> {
    let project = state.domain.update_project(id, &body).await?;
    Ok(Json(project))
}

/// DELETE /api/projects/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    state.domain.delete_project(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
