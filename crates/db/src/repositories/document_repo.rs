//! Repository for the `documents` table.

use crm_core::normalize::NewDocument;
use crm_core::types::{DbId, Timestamp};
use sqlx::{PgExecutor, PgPool};

use crate::models::document::Document;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, file_path, mime_type, size_bytes, client_id, created_at, updated_at";

/// Provides CRUD operations for client documents.
pub struct DocumentRepo;

impl DocumentRepo {
    /// Insert document metadata. The file itself must already be stored.
    pub async fn create(
        executor: impl PgExecutor<'_>,
        input: &NewDocument,
        now: Timestamp,
    ) -> Result<Document, sqlx::Error> {
        let query = format!(
            "INSERT INTO documents (name, file_path, mime_type, size_bytes, client_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(&input.name)
            .bind(&input.file_path)
            .bind(&input.mime_type)
            .bind(input.size_bytes)
            .bind(input.client_id)
            .bind(now)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Document>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE id = $1");
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a client's documents, newest first.
    pub async fn list_by_client(
        executor: impl PgExecutor<'_>,
        client_id: DbId,
    ) -> Result<Vec<Document>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM documents WHERE client_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(client_id)
            .fetch_all(executor)
            .await
    }

    /// Permanently delete a document row. Returns `true` if a row was removed.
    pub async fn delete(executor: impl PgExecutor<'_>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every document row of a client. Returns the number removed.
    pub async fn delete_by_client(
        executor: impl PgExecutor<'_>,
        client_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM documents WHERE client_id = $1")
            .bind(client_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
