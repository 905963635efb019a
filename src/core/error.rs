use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::shared::types::ApiResponse;

/// Postgres SQLSTATE codes the record store maps onto client-facing errors
mod sqlstate {
    pub const FOREIGN_KEY_VIOLATION: &str = "23503";
    pub const UNIQUE_VIOLATION: &str = "23505";
    pub const NOT_NULL_VIOLATION: &str = "23502";
    pub const CHECK_VIOLATION: &str = "23514";
    pub const INVALID_TEXT_REPRESENTATION: &str = "22P02";
    pub const INVALID_DATETIME_FORMAT: &str = "22007";
    pub const DATETIME_FIELD_OVERFLOW: &str = "22008";
    pub const QUERY_CANCELED: &str = "57014";
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A foreign key points at a parent that does not exist (or is deleted)
    #[error("Referential violation: {0}")]
    ReferentialViolation(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Timeout: {0}")]
    Timeout(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => {
                AppError::Timeout("Timed out waiting for a database connection".to_string())
            }
            sqlx::Error::PoolClosed => {
                AppError::StoreUnavailable("Database pool is closed".to_string())
            }
            sqlx::Error::Io(e) => AppError::StoreUnavailable(format!("Database I/O error: {}", e)),
            sqlx::Error::Tls(e) => AppError::StoreUnavailable(format!("Database TLS error: {}", e)),
            sqlx::Error::Database(db) => {
                let code = db.code().map(|c| c.into_owned());
                let detail = db.message().to_string();
                match code.as_deref() {
                    Some(sqlstate::FOREIGN_KEY_VIOLATION) => AppError::ReferentialViolation(
                        db.constraint()
                            .map(|c| format!("{} ({})", detail, c))
                            .unwrap_or(detail),
                    ),
                    Some(sqlstate::UNIQUE_VIOLATION) => AppError::Conflict(detail),
                    // statement_timeout
                    Some(sqlstate::QUERY_CANCELED) => AppError::Timeout(detail),
                    Some(sqlstate::NOT_NULL_VIOLATION)
                    | Some(sqlstate::CHECK_VIOLATION)
                    | Some(sqlstate::INVALID_TEXT_REPRESENTATION)
                    | Some(sqlstate::INVALID_DATETIME_FORMAT)
                    | Some(sqlstate::DATETIME_FIELD_OVERFLOW) => AppError::BadRequest(detail),
                    _ => AppError::Database(sqlx::Error::Database(db)),
                }
            }
            other => AppError::Database(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                    None,
                )
            }
            AppError::NotFound(ref msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            AppError::Validation(ref msg) => (
                StatusCode::BAD_REQUEST,
                msg.clone(),
                Some(vec![msg.clone()]),
            ),
            AppError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
            AppError::Auth(ref msg) => (StatusCode::UNAUTHORIZED, msg.clone(), None),
            AppError::Unauthorized(ref msg) => (StatusCode::UNAUTHORIZED, msg.clone(), None),
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, msg.clone(), None),
            AppError::ReferentialViolation(ref msg) => (StatusCode::CONFLICT, msg.clone(), None),
            AppError::StoreUnavailable(ref msg) => {
                tracing::error!("Store unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, msg.clone(), None)
            }
            AppError::Timeout(ref msg) => {
                tracing::warn!("Store timeout: {}", msg);
                (StatusCode::GATEWAY_TIMEOUT, msg.clone(), None)
            }
        };

        let body = Json(ApiResponse::<()>::error(Some(message), errors));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
