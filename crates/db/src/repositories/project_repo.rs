//! Repository for the `projects` table.

use crm_core::filters::{ContactWindow, ProjectFilter};
use crm_core::normalize::{NewProject, ProjectPatch};
use crm_core::types::{DbId, Timestamp};
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};

use crate::models::project::{Project, ProjectListRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, phone, contact_name, project_type, affiliate_partner, category, \
     last_contacted, status, active_stage, has_invoice, assigned_to_id, client_id, \
     created_at, updated_at";

/// Project columns qualified for the assignee join.
const LIST_COLUMNS: &str = "p.id, p.name, p.phone, p.contact_name, p.project_type, \
     p.affiliate_partner, p.category, p.last_contacted, p.status, p.active_stage, \
     p.has_invoice, p.assigned_to_id, p.client_id, p.created_at, p.updated_at, \
     m.name AS assignee_name, m.avatar AS assignee_avatar";

/// Provides CRUD and reporting queries for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a project with both timestamps set to `now`.
    ///
    /// `input.assigned_to_id` must already be resolved; a `None` here violates
    /// the `NOT NULL` constraint.
    pub async fn create(
        executor: impl PgExecutor<'_>,
        input: &NewProject,
        now: Timestamp,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects
                (name, phone, contact_name, project_type, affiliate_partner, category,
                 last_contacted, status, active_stage, has_invoice, assigned_to_id, client_id,
                 created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.name)
            .bind(&input.phone)
            .bind(&input.contact_name)
            .bind(input.project_type.as_str())
            .bind(&input.affiliate_partner)
            .bind(&input.category)
            .bind(input.last_contacted)
            .bind(input.status.as_str())
            .bind(&input.active_stage)
            .bind(&input.has_invoice)
            .bind(input.assigned_to_id)
            .bind(input.client_id)
            .bind(now)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a project and lock its row until the surrounding transaction ends.
    pub async fn find_by_id_for_update(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List projects joined with their assignee, most recently updated first.
    ///
    /// Every populated field of `filter` narrows the result. `window` bounds
    /// `last_contacted` inclusively; rows with no contact date never match it.
    pub async fn list(
        pool: &PgPool,
        filter: &ProjectFilter,
        window: Option<ContactWindow>,
    ) -> Result<Vec<ProjectListRow>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
        qb.push(LIST_COLUMNS);
        qb.push(" FROM projects p JOIN team_members m ON m.id = p.assigned_to_id WHERE TRUE");

        if let Some(status) = &filter.status {
            qb.push(" AND p.status = ").push_bind(status.clone());
        }
        if let Some(assigned_to_id) = filter.assigned_to_id {
            qb.push(" AND p.assigned_to_id = ").push_bind(assigned_to_id);
        }
        if let Some(project_type) = &filter.project_type {
            qb.push(" AND p.project_type = ").push_bind(project_type.clone());
        }
        if let Some(partner) = &filter.affiliate_partner {
            qb.push(" AND p.affiliate_partner = ").push_bind(partner.clone());
        }
        if let Some(category) = &filter.category {
            qb.push(" AND p.category = ").push_bind(category.clone());
        }
        if let Some(client_id) = filter.client_id {
            qb.push(" AND p.client_id = ").push_bind(client_id);
        }
        if let Some(window) = window {
            qb.push(" AND p.last_contacted >= ").push_bind(window.from);
            qb.push(" AND p.last_contacted <= ").push_bind(window.to);
        }

        qb.push(" ORDER BY p.updated_at DESC, p.id DESC");

        qb.build_query_as::<ProjectListRow>().fetch_all(pool).await
    }

    /// Apply the fields present in `patch` and bump `updated_at`.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        executor: impl PgExecutor<'_>,
        id: DbId,
        patch: &ProjectPatch,
        now: Timestamp,
    ) -> Result<Option<Project>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE projects SET updated_at = ");
        qb.push_bind(now);

        if let Some(name) = &patch.name {
            qb.push(", name = ").push_bind(name.clone());
        }
        if let Some(phone) = &patch.phone {
            qb.push(", phone = ").push_bind(phone.clone());
        }
        if let Some(contact_name) = &patch.contact_name {
            qb.push(", contact_name = ").push_bind(contact_name.clone());
        }
        if let Some(project_type) = patch.project_type {
            qb.push(", project_type = ").push_bind(project_type.as_str());
        }
        if let Some(partner) = &patch.affiliate_partner {
            qb.push(", affiliate_partner = ").push_bind(partner.clone());
        }
        if let Some(category) = &patch.category {
            qb.push(", category = ").push_bind(category.clone());
        }
        if let Some(last_contacted) = patch.last_contacted {
            qb.push(", last_contacted = ").push_bind(last_contacted);
        }
        if let Some(status) = patch.status {
            qb.push(", status = ").push_bind(status.as_str());
        }
        if let Some(stage) = &patch.active_stage {
            qb.push(", active_stage = ").push_bind(stage.clone());
        }
        if let Some(has_invoice) = &patch.has_invoice {
            qb.push(", has_invoice = ").push_bind(has_invoice.clone());
        }
        if let Some(assigned_to_id) = patch.assigned_to_id {
            qb.push(", assigned_to_id = ").push_bind(assigned_to_id);
        }
        if let Some(client_id) = patch.client_id {
            qb.push(", client_id = ").push_bind(client_id);
        }

        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" RETURNING ").push(COLUMNS);

        qb.build_query_as::<Project>().fetch_optional(executor).await
    }

    /// Permanently delete a project. Returns `true` if a row was removed.
    pub async fn delete(executor: impl PgExecutor<'_>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every project linked to a client. Returns the number removed.
    pub async fn delete_by_client(
        executor: impl PgExecutor<'_>,
        client_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE client_id = $1")
            .bind(client_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    // -----------------------------------------------------------------------
    // Reporting
    // -----------------------------------------------------------------------

    /// `(status, count)` for every stored status value, known or not.
    pub async fn count_by_status(pool: &PgPool) -> Result<Vec<(String, i64)>, sqlx::Error> {
        sqlx::query_as("SELECT status, COUNT(*) FROM projects GROUP BY status")
            .fetch_all(pool)
            .await
    }

    pub async fn count_created_since(pool: &PgPool, since: Timestamp) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE created_at >= $1")
            .bind(since)
            .fetch_one(pool)
            .await
    }

    /// Last-contacted dates of every project with the given status.
    pub async fn last_contacted_for_status(
        pool: &PgPool,
        status: &str,
    ) -> Result<Vec<Option<Timestamp>>, sqlx::Error> {
        sqlx::query_scalar("SELECT last_contacted FROM projects WHERE status = $1")
            .bind(status)
            .fetch_all(pool)
            .await
    }

    /// The `limit` most recently updated projects.
    pub async fn list_recently_updated(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects ORDER BY updated_at DESC, id DESC LIMIT $1"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
