//! Repository for the `team_members` table.

use crm_core::normalize::NewTeamMember;
use crm_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::team_member::TeamMember;

const COLUMNS: &str = "id, name, email, role, avatar";

pub struct TeamMemberRepo;

impl TeamMemberRepo {
    /// Insert a team member, returning the created row.
    pub async fn create(
        executor: impl PgExecutor<'_>,
        input: &NewTeamMember,
    ) -> Result<TeamMember, sqlx::Error> {
        let query = format!(
            "INSERT INTO team_members (name, email, role, avatar)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TeamMember>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.role)
            .bind(&input.avatar)
            .fetch_one(executor)
            .await
    }

    /// List all team members ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<TeamMember>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM team_members ORDER BY name ASC, id ASC");
        sqlx::query_as::<_, TeamMember>(&query).fetch_all(pool).await
    }

    /// ID of the first team member in name order, if any exist.
    pub async fn first_by_name(executor: impl PgExecutor<'_>) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT id FROM team_members ORDER BY name ASC, id ASC LIMIT 1")
            .fetch_optional(executor)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM team_members")
            .fetch_one(pool)
            .await
    }
}
