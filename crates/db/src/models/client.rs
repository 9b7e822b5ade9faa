//! Client model.

use crm_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `clients` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: DbId,
    pub name: String,
    pub status: String,
    pub last_contacted: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A client plus the number of documents filed under it.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientWithDocumentCount {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub client: Client,
    pub document_count: i64,
}
