use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use crm_core::error::CoreError;
use crm_domain::DomainError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `crm_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The request body exceeded the configured upload limit.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Core(core) => AppError::Core(core),
            DomainError::Database(db) => AppError::Database(db),
            DomainError::File(io) => AppError::InternalError(format!("File storage: {io}")),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Foreign key violations (`23503`) map to 400: the payload referenced a
///   row that does not exist.
/// - Unique constraint violations (`23505`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
///
/// Constraint names are logged, never returned; the body names the payload
/// field instead.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or("unknown");
            match db_err.code().as_deref() {
                Some("23503") => {
                    tracing::warn!(constraint, "Foreign key violation");
                    (
                        StatusCode::BAD_REQUEST,
                        "INVALID_REFERENCE",
                        field_message(constraint, "referenced record does not exist"),
                    )
                }
                Some("23505") => {
                    tracing::warn!(constraint, "Unique constraint violation");
                    (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        field_message(constraint, "value is already in use"),
                    )
                }
                _ => {
                    tracing::error!(error = %db_err, "Database error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            }
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

/// Payload field guarded by a named constraint.
fn constraint_field(constraint: &str) -> Option<&'static str> {
    match constraint {
        "projects_assigned_to_id_fkey" => Some("assignedToId"),
        "projects_client_id_fkey" | "documents_client_id_fkey" => Some("clientId"),
        "uq_team_members_email" => Some("email"),
        _ => None,
    }
}

fn field_message(constraint: &str, problem: &str) -> String {
    match constraint_field(constraint) {
        Some(field) => format!("{field}: {problem}"),
        None => format!("Invalid value: {problem}"),
    }
}
