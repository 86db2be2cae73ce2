//! Domain error types for the Mesa de Partes server.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.
//! Messages carried by `Validation`, `NotFound`, `Forbidden`, `Expired` and
//! `InvalidCode` are shown to citizens verbatim, so they are written in Spanish.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use std::fmt;

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Input failed schema checks
    #[error("{0}")]
    Validation(String),

    /// Resource not found
    #[error("{0}")]
    NotFound(String),

    /// Missing or invalid administrator session
    #[error("{0}")]
    Unauthorized(String),

    /// Caller is identified but not allowed to see or do this
    #[error("{0}")]
    Forbidden(String),

    /// Verification code past its expiry
    #[error("{0}")]
    Expired(String),

    /// Verification code does not match
    #[error("{0}")]
    InvalidCode(String),

    /// Outbound email could not be delivered
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Storage (S3) operation failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Uploaded file exceeds configured limits
    #[error("{0}")]
    PayloadTooLarge(String),
}

impl AppError {
    /// Stable machine-readable code used in error response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Expired(_) => "CODE_EXPIRED",
            AppError::InvalidCode(_) => "INVALID_CODE",
            AppError::Delivery(_) => "DELIVERY_ERROR",
            AppError::Database(_) => "PERSISTENCE_ERROR",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidCode(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Expired(_) => StatusCode::GONE,
            AppError::Delivery(_) | AppError::Storage(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Database(err_str) => {
                tracing::error!("Database error: {}", err_str);
                "Ocurrió un error interno. Por favor, intenta nuevamente.".to_string()
            }
            AppError::Storage(err_str) => {
                tracing::error!("Storage error: {}", err_str);
                "No se pudo almacenar el archivo. Por favor, intenta nuevamente.".to_string()
            }
            AppError::Delivery(err_str) => {
                tracing::error!("Delivery error: {}", err_str);
                "No se pudo enviar el correo electrónico. Por favor, intenta nuevamente."
                    .to_string()
            }
            _ => self.to_string(),
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.code().to_string(),
            message,
        })
    }
}

/// Error response body matching OpenAPI schema.
#[derive(Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(format!("JSON inválido: {}", err))
    }
}
