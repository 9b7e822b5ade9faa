use crm_core::error::CoreError;

/// Failure of a domain operation.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// Validation or lookup failure raised by domain rules.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Writing or opening a stored document file failed.
    #[error("File storage error: {0}")]
    File(#[from] std::io::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
