use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum CoreError {
    #[error("invalid short code: {0}")]
    InvalidShortCode(String),
}

/// Errors raised by storage backends.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("short code already exists: {0}")]
    Conflict(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("storage operation failed: {0}")]
    Operation(String),
}

/// Errors surfaced by the shortening service.
#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("short URL not found: {0}")]
    NotFound(String),
    #[error("unable to generate a unique short code after {attempts} attempts")]
    ExhaustedRetries { attempts: usize },
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<CoreError> for ShortenerError {
    fn from(value: CoreError) -> Self {
        match value {
            CoreError::InvalidShortCode(message) => Self::InvalidInput(message),
        }
    }
}
