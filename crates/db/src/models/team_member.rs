//! Team member model.

use crm_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `team_members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub role: String,
    pub avatar: Option<String>,
}

/// Public fields of an assignee embedded in project listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssigneeSummary {
    pub id: DbId,
    pub name: String,
    pub avatar: Option<String>,
}
