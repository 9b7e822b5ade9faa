//! Repository for the `clients` table.

use crm_core::normalize::{ClientPatch, NewClient};
use crm_core::types::{DbId, Timestamp};
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};

use crate::models::client::{Client, ClientWithDocumentCount};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, status, last_contacted, created_at, updated_at";

/// Client columns plus a correlated document count.
const COUNTED_COLUMNS: &str = "c.id, c.name, c.status, c.last_contacted, c.created_at, c.updated_at, \
     (SELECT COUNT(*) FROM documents d WHERE d.client_id = c.id) AS document_count";

/// Provides CRUD operations for clients.
pub struct ClientRepo;

impl ClientRepo {
    /// Insert a client with both timestamps set to `now`.
    pub async fn create(
        executor: impl PgExecutor<'_>,
        input: &NewClient,
        now: Timestamp,
    ) -> Result<Client, sqlx::Error> {
        let query = format!(
            "INSERT INTO clients (name, status, last_contacted, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(&input.name)
            .bind(input.status.as_str())
            .bind(input.last_contacted)
            .bind(now)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<Client>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clients WHERE id = $1");
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a client and lock its row until the surrounding transaction ends.
    pub async fn find_by_id_for_update(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<Client>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clients WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_with_document_count(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ClientWithDocumentCount>, sqlx::Error> {
        let query = format!("SELECT {COUNTED_COLUMNS} FROM clients c WHERE c.id = $1");
        sqlx::query_as::<_, ClientWithDocumentCount>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List clients (optionally with an exact status) by most recently updated.
    pub async fn list_with_document_counts(
        pool: &PgPool,
        status: Option<&str>,
    ) -> Result<Vec<ClientWithDocumentCount>, sqlx::Error> {
        let query = format!(
            "SELECT {COUNTED_COLUMNS} FROM clients c
             WHERE ($1::TEXT IS NULL OR c.status = $1)
             ORDER BY c.updated_at DESC, c.id DESC"
        );
        sqlx::query_as::<_, ClientWithDocumentCount>(&query)
            .bind(status)
            .fetch_all(pool)
            .await
    }

    /// Apply the fields present in `patch` and bump `updated_at`.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        executor: impl PgExecutor<'_>,
        id: DbId,
        patch: &ClientPatch,
        now: Timestamp,
    ) -> Result<Option<Client>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE clients SET updated_at = ");
        qb.push_bind(now);
        if let Some(name) = &patch.name {
            qb.push(", name = ").push_bind(name.clone());
        }
        if let Some(status) = patch.status {
            qb.push(", status = ").push_bind(status.as_str());
        }
        if let Some(last_contacted) = patch.last_contacted {
            qb.push(", last_contacted = ").push_bind(last_contacted);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" RETURNING ").push(COLUMNS);

        qb.build_query_as::<Client>().fetch_optional(executor).await
    }

    /// Overwrite `last_contacted` and bump `updated_at`.
    pub async fn set_last_contacted(
        executor: impl PgExecutor<'_>,
        id: DbId,
        last_contacted: Timestamp,
        now: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE clients SET last_contacted = $2, updated_at = $3 WHERE id = $1")
                .bind(id)
                .bind(last_contacted)
                .bind(now)
                .execute(executor)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Overwrite `status` and bump `updated_at`.
    pub async fn set_status(
        executor: impl PgExecutor<'_>,
        id: DbId,
        status: &str,
        now: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE clients SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(status)
            .bind(now)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Permanently delete a client. Dependent rows must already be gone.
    pub async fn delete(executor: impl PgExecutor<'_>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM clients")
            .fetch_one(pool)
            .await
    }

    pub async fn count_with_status(pool: &PgPool, status: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM clients WHERE status = $1")
            .bind(status)
            .fetch_one(pool)
            .await
    }
}
