//! Team members and the fallback assignee policy.

use crm_core::error::CoreError;
use crm_core::normalize::{self, NewTeamMember};
use crm_core::types::DbId;
use crm_db::models::team_member::TeamMember;
use crm_db::repositories::TeamMemberRepo;
use serde_json::Value;
use sqlx::PgConnection;
use tracing::info;

use crate::{DomainResult, DomainService};

impl DomainService {
    /// All team members, sorted by name.
    pub async fn list_team_members(&self) -> DomainResult<Vec<TeamMember>> {
        Ok(TeamMemberRepo::list(&self.pool).await?)
    }

    pub async fn create_team_member(&self, body: &Value) -> DomainResult<TeamMember> {
        let input = normalize::new_team_member(body)?;
        self.insert_team_member(&input).await
    }

    pub async fn insert_team_member(&self, input: &NewTeamMember) -> DomainResult<TeamMember> {
        let member = TeamMemberRepo::create(&self.pool, input).await?;
        info!(team_member_id = member.id, name = %member.name, "Team member created");
        Ok(member)
    }

    /// Insert `members` only if the table is empty. Returns how many were
    /// inserted. Every entry is validated before anything is written.
    pub async fn seed_team_members(&self, members: &[Value]) -> DomainResult<usize> {
        if TeamMemberRepo::count(&self.pool).await? > 0 {
            info!("Team members already present, skipping seed");
            return Ok(0);
        }

        let inputs = members
            .iter()
            .map(normalize::new_team_member)
            .collect::<Result<Vec<_>, _>>()?;

        let mut tx = self.pool.begin().await?;
        for input in &inputs {
            TeamMemberRepo::create(&mut *tx, input).await?;
        }
        tx.commit().await?;

        info!(count = inputs.len(), "Seeded team members");
        Ok(inputs.len())
    }

    /// Assignee used when a new project names none: the first team member
    /// in name order.
    pub(crate) async fn fallback_assignee(conn: &mut PgConnection) -> DomainResult<DbId> {
        TeamMemberRepo::first_by_name(&mut *conn)
            .await?
            .ok_or_else(|| {
                CoreError::Validation(
                    "assignedToId: no team members exist to assign the project to".into(),
                )
                .into()
            })
    }
}
