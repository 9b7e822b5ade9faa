//! Client operations, including the delete cascade.

use crm_core::error::CoreError;
use crm_core::filters::ALL;
use crm_core::normalize::{self, ClientPatch, NewClient};
use crm_core::types::DbId;
use crm_db::models::client::{Client, ClientWithDocumentCount};
use crm_db::repositories::{ClientRepo, DocumentRepo, ProjectRepo};
use serde_json::Value;
use tracing::info;

use crate::{DomainResult, DomainService};

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Client",
        id,
    }
}

/// What a client delete removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientDeletion {
    pub client_deleted: bool,
    pub documents_deleted: u64,
    pub projects_deleted: u64,
    /// Physical files that could not be removed (already logged).
    pub files_left_behind: usize,
}

impl DomainService {
    /// List clients with document counts, most recently updated first.
    ///
    /// `status` of `None`, empty, or `"all"` lists every client.
    pub async fn list_clients(
        &self,
        status: Option<&str>,
    ) -> DomainResult<Vec<ClientWithDocumentCount>> {
        let status = status.map(str::trim).filter(|s| !s.is_empty() && *s != ALL);
        Ok(ClientRepo::list_with_document_counts(&self.pool, status).await?)
    }

    pub async fn get_client(&self, id: DbId) -> DomainResult<ClientWithDocumentCount> {
        ClientRepo::find_with_document_count(&self.pool, id)
            .await?
            .ok_or_else(|| not_found(id).into())
    }

    pub async fn create_client(&self, body: &Value) -> DomainResult<Client> {
        let input = normalize::new_client(body)?;
        self.insert_client(&input).await
    }

    pub async fn insert_client(&self, input: &NewClient) -> DomainResult<Client> {
        let input = normalize::check(input.clone())?;
        let client = ClientRepo::create(&self.pool, &input, self.now()).await?;
        info!(client_id = client.id, "Client created");
        Ok(client)
    }

    /// Partial update. An explicit `lastContacted` here is the client's own
    /// update and may move the value in either direction.
    pub async fn update_client(&self, id: DbId, body: &Value) -> DomainResult<Client> {
        let patch = normalize::client_patch(body)?;
        self.patch_client(id, &patch).await
    }

    pub async fn patch_client(&self, id: DbId, patch: &ClientPatch) -> DomainResult<Client> {
        let client = ClientRepo::update(&self.pool, id, patch, self.now())
            .await?
            .ok_or_else(|| not_found(id))?;
        info!(client_id = id, "Client updated");
        Ok(client)
    }

    /// Delete a client together with its documents and projects.
    ///
    /// All row deletes share one transaction, so a database failure leaves
    /// everything in place and is returned to the caller. Physical files are
    /// removed only after the commit, best-effort.
    pub async fn delete_client(&self, id: DbId) -> DomainResult<ClientDeletion> {
        let mut tx = self.pool.begin().await?;

        let documents = DocumentRepo::list_by_client(&mut *tx, id).await?;
        let documents_deleted = DocumentRepo::delete_by_client(&mut *tx, id).await?;
        let projects_deleted = ProjectRepo::delete_by_client(&mut *tx, id).await?;
        let client_deleted = ClientRepo::delete(&mut *tx, id).await?;

        tx.commit().await?;

        let mut files_left_behind = 0;
        for document in &documents {
            if !self.files.remove_best_effort(&document.file_path).await {
                files_left_behind += 1;
            }
        }

        let outcome = ClientDeletion {
            client_deleted,
            documents_deleted,
            projects_deleted,
            files_left_behind,
        };
        info!(
            client_id = id,
            client_deleted,
            documents_deleted,
            projects_deleted,
            files_left_behind,
            "Client delete cascade finished"
        );
        Ok(outcome)
    }
}
