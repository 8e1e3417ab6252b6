//! Transfer error taxonomy.
//!
//! Each variant carries a stable string code and an HTTP status so the
//! gateway can map errors without matching on variants.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use super::status::TransferStatus;
use crate::audit::AuditError;

#[derive(Error, Debug, Clone)]
pub enum TransferError {
    // === Validation (rejected before any write) ===
    #[error("amount must be greater than zero")]
    InvalidAmount,

    #[error("currency must not be empty")]
    InvalidCurrency,

    #[error("invalid request: {0}")]
    Validation(String),

    // === Lookup ===
    #[error("transfer not found: {0}")]
    NotFound(String),

    // === State machine conflicts ===
    #[error("cannot process a transfer in status {0}")]
    NotProcessable(TransferStatus),

    #[error("cannot cancel a transfer in status {0}: only PENDING transfers can be canceled")]
    NotCancelable(TransferStatus),

    // === Infrastructure ===
    #[error("reference already exists: {0}")]
    DuplicateReference(String),

    #[error("unexpected state transition: {0}")]
    InvalidTransition(String),

    #[error("database error: {0}")]
    Database(String),
}

impl TransferError {
    /// Stable error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::InvalidAmount => "INVALID_AMOUNT",
            TransferError::InvalidCurrency => "INVALID_CURRENCY",
            TransferError::Validation(_) => "VALIDATION_ERROR",
            TransferError::NotFound(_) => "TRANSFER_NOT_FOUND",
            TransferError::NotProcessable(_) | TransferError::NotCancelable(_) => "STATUS_CONFLICT",
            TransferError::DuplicateReference(_) => "DUPLICATE_REFERENCE",
            TransferError::InvalidTransition(_) => "INVALID_STATE_TRANSITION",
            TransferError::Database(_) => "DATABASE_ERROR",
        }
    }

    /// HTTP status for the boundary
    pub fn http_status(&self) -> StatusCode {
        match self {
            TransferError::InvalidAmount
            | TransferError::InvalidCurrency
            | TransferError::Validation(_) => StatusCode::BAD_REQUEST,
            TransferError::NotFound(_) => StatusCode::NOT_FOUND,
            TransferError::NotProcessable(_) | TransferError::NotCancelable(_) => {
                StatusCode::CONFLICT
            }
            TransferError::DuplicateReference(_)
            | TransferError::InvalidTransition(_)
            | TransferError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for TransferError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = e {
            // 23505 = unique_violation; the only unique index besides the
            // primary key is on `reference`
            if db_err.code().as_deref() == Some("23505") {
                return TransferError::DuplicateReference(db_err.to_string());
            }
        }
        TransferError::Database(e.to_string())
    }
}

impl From<AuditError> for TransferError {
    fn from(e: AuditError) -> Self {
        TransferError::Database(e.to_string())
    }
}

/// JSON error body returned to API clients.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Stable machine-readable code
    #[schema(example = "STATUS_CONFLICT")]
    pub code: String,
    /// Human-readable description
    pub message: String,
}

impl ErrorBody {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl IntoResponse for TransferError {
    fn into_response(self) -> Response {
        let body = ErrorBody::new(self.code(), self.to_string());
        (self.http_status(), Json(body)).into_response()
    }
}
