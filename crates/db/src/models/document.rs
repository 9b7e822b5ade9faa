//! Document model.

use crm_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `documents` table. `file_path` is relative to the upload
/// root.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DbId,
    pub name: String,
    pub file_path: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub client_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
