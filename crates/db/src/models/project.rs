//! Project model.

use crm_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::team_member::AssigneeSummary;

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub phone: Option<String>,
    pub contact_name: Option<String>,
    #[serde(rename = "type")]
    pub project_type: String,
    pub affiliate_partner: Option<String>,
    pub category: Option<String>,
    pub last_contacted: Option<Timestamp>,
    pub status: String,
    pub active_stage: Option<String>,
    pub has_invoice: String,
    pub assigned_to_id: DbId,
    pub client_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A project joined with its assignee's public fields.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectListRow {
    #[sqlx(flatten)]
    pub project: Project,
    pub assignee_name: String,
    pub assignee_avatar: Option<String>,
}

/// API shape of a listed project.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectWithAssignee {
    #[serde(flatten)]
    pub project: Project,
    pub assigned_to: AssigneeSummary,
}

impl From<ProjectListRow> for ProjectWithAssignee {
    fn from(row: ProjectListRow) -> Self {
        let assigned_to = AssigneeSummary {
            id: row.project.assigned_to_id,
            name: row.assignee_name,
            avatar: row.assignee_avatar,
        };
        Self {
            project: row.project,
            assigned_to,
        }
    }
}
