use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use snip_core::ShortenerError;
use thiserror::Error;
use tracing::{debug, error};

use crate::model::ErrorResponse;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(&'static str),
    #[error(transparent)]
    Shortener(#[from] ShortenerError),
    #[error("{0}")]
    Internal(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Client errors go back verbatim; server-side detail stays in the logs.
        let (status, message) = match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message.to_string()),
            AppError::Shortener(ShortenerError::InvalidInput(message)) => {
                (StatusCode::BAD_REQUEST, message)
            }
            AppError::Shortener(ShortenerError::NotFound(code)) => {
                debug!(code = %code, "short code not found");
                (StatusCode::NOT_FOUND, "Short URL not found".to_string())
            }
            AppError::Shortener(ShortenerError::ExhaustedRetries { attempts }) => {
                error!(attempts, "exhausted short code attempts");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Unable to generate unique short code".to_string(),
                )
            }
            AppError::Shortener(ShortenerError::Storage(err)) => {
                error!(error = %err, "storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal(detail) => {
                error!(error = %detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
