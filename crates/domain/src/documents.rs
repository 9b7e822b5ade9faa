//! Client documents: metadata rows plus their stored files.

use crm_core::error::CoreError;
use crm_core::files::{client_relative_path, random_stored_file_name, DEFAULT_MIME_TYPE};
use crm_core::normalize::{self, NewDocument};
use crm_core::types::DbId;
use crm_db::models::document::Document;
use crm_db::repositories::{ClientRepo, DocumentRepo};
use tracing::{info, warn};

use crate::{DomainError, DomainResult, DomainService};

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Document",
        id,
    }
}

/// A file received by the upload boundary.
#[derive(Debug, Clone)]
pub struct Upload {
    /// File name as sent by the client. Only its extension is kept on disk.
    pub original_name: String,
    /// Optional display name; defaults to `original_name`.
    pub display_name: Option<String>,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl DomainService {
    /// A client's documents, newest first.
    pub async fn list_documents_by_client(&self, client_id: DbId) -> DomainResult<Vec<Document>> {
        Ok(DocumentRepo::list_by_client(&self.pool, client_id).await?)
    }

    pub async fn get_document(&self, id: DbId) -> DomainResult<Document> {
        DocumentRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| not_found(id).into())
    }

    /// Persist metadata for a file that is already durably stored.
    pub async fn create_document(&self, input: NewDocument) -> DomainResult<Document> {
        let input = normalize::check(input)?;
        let document = DocumentRepo::create(&self.pool, &input, self.now()).await?;
        info!(document_id = document.id, client_id = document.client_id, "Document created");
        Ok(document)
    }

    /// Store an uploaded file under the client's directory and record it.
    ///
    /// The file is written (and synced) before the row is inserted. If the
    /// insert fails the file is removed again, best-effort.
    pub async fn upload_document(&self, client_id: DbId, upload: Upload) -> DomainResult<Document> {
        if ClientRepo::find_by_id(&self.pool, client_id).await?.is_none() {
            return Err(CoreError::NotFound {
                entity: "Client",
                id: client_id,
            }
            .into());
        }

        let now = self.now();
        let stored_name = random_stored_file_name(now, &upload.original_name);
        let file_path = client_relative_path(client_id, &stored_name);

        let name = upload
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(upload.original_name.trim())
            .to_string();
        let mime_type = upload
            .mime_type
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());

        let input = normalize::check(NewDocument {
            name,
            file_path: file_path.clone(),
            mime_type,
            size_bytes: i64::try_from(upload.bytes.len()).unwrap_or(i64::MAX),
            client_id,
        })?;

        self.files.write(&file_path, &upload.bytes).await?;

        match self.create_document(input).await {
            Ok(document) => Ok(document),
            Err(e) => {
                warn!(client_id, path = %file_path, error = %e, "Document insert failed, removing stored file");
                self.files.remove_best_effort(&file_path).await;
                Err(e)
            }
        }
    }

    /// Look up a document for download and open its file.
    ///
    /// Fails with `NotFound` when the row is missing, belongs to another
    /// client, or its file is gone from disk.
    pub async fn open_document(
        &self,
        client_id: DbId,
        id: DbId,
    ) -> DomainResult<(Document, tokio::fs::File)> {
        let document = self.get_document(id).await?;
        if document.client_id != client_id {
            return Err(not_found(id).into());
        }
        match self.files.open(&document.file_path).await {
            Ok(file) => Ok((document, file)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(document_id = id, path = %document.file_path, "Stored file missing on disk");
                Err(not_found(id).into())
            }
            Err(e) => Err(DomainError::File(e)),
        }
    }

    /// Remove a client's document file (best-effort) and its row.
    ///
    /// Deleting an unknown id is a no-op. A document filed under another
    /// client is reported as `NotFound`.
    pub async fn delete_document(&self, client_id: DbId, id: DbId) -> DomainResult<()> {
        let Some(document) = DocumentRepo::find_by_id(&self.pool, id).await? else {
            return Ok(());
        };
        if document.client_id != client_id {
            return Err(not_found(id).into());
        }
        self.files.remove_best_effort(&document.file_path).await;
        let deleted = DocumentRepo::delete(&self.pool, id).await?;
        info!(document_id = id, client_id, deleted, "Document deleted");
        Ok(())
    }
}
