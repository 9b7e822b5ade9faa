//! Handlers for documents nested under `/clients/{id}/documents`.

use axum::body::Body;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use axum::Json;
use crm_core::files::attachment_disposition;
use crm_core::types::DbId;
use crm_db::models::document::Document;
use crm_domain::documents::Upload;
use tokio_util::io::ReaderStream;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Multipart errors caused by the body limit become 413, the rest 400.
fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(err.body_text())
    }
}

/// GET /api/clients/{id}/documents
pub async fn list_by_client(
    State(state): State<AppState>,
    Path(client_id): Path<DbId>,
) -> AppResult<Json<Vec<Document>>> {
    let documents = state.domain.list_documents_by_client(client_id).await?;
    Ok(Json(documents))
}

/// POST /api/clients/{id}/documents
///
/// Accepts a multipart form with a required `file` field and an optional
/// `name` field used as the display name.
pub async fn upload(
    State(state): State<AppState>,
    Path(client_id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<Document>)> {
    let mut file: Option<(String, Option<String>, Vec<u8>)> = None;
    let mut display_name: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let mime_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(multipart_error)?;
                file = Some((filename, mime_type, data.to_vec()));
            }
            "name" => {
                let text = field.text().await.map_err(multipart_error)?;
                display_name = Some(text);
            }
            _ => {} // ignore unknown fields
        }
    }

    let (original_name, mime_type, bytes) =
        file.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;

    let document = state
        .domain
        .upload_document(
            client_id,
            Upload {
                original_name,
                display_name,
                mime_type,
                bytes,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(document)))
}

/// GET /api/clients/{id}/documents/{document_id}/download
///
/// Streams the stored file with its recorded MIME type, as an attachment
/// named after the document.
pub async fn download(
    State(state): State<AppState>,
    Path((client_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Response> {
    let (document, file) = state.domain.open_document(client_id, id).await?;
    let length = file
        .metadata()
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .len();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, document.mime_type.as_str())
        .header(header::CONTENT_LENGTH, length.to_string())
        .header(
            header::CONTENT_DISPOSITION,
            attachment_disposition(&document.name),
        )
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| AppError::InternalError(e.to_string()))
}

/// DELETE /api/clients/{id}/documents/{document_id}
pub async fn delete(
    State(state): State<AppState>,
    Path((client_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    state.domain.delete_document(client_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
