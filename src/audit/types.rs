//! Audit entry types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Lifecycle event recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    TransferCreated,
    TransferProcessing,
    TransferSuccess,
    TransferFailed,
    TransferCanceled,
}

impl AuditAction {
    /// Wire/storage form of the action name
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::TransferCreated => "TRANSFER_CREATED",
            AuditAction::TransferProcessing => "TRANSFER_PROCESSING",
            AuditAction::TransferSuccess => "TRANSFER_SUCCESS",
            AuditAction::TransferFailed => "TRANSFER_FAILED",
            AuditAction::TransferCanceled => "TRANSFER_CANCELED",
        }
    }

    /// Parse the storage form back into an action
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "TRANSFER_CREATED" => Some(AuditAction::TransferCreated),
            "TRANSFER_PROCESSING" => Some(AuditAction::TransferProcessing),
            "TRANSFER_SUCCESS" => Some(AuditAction::TransferSuccess),
            "TRANSFER_FAILED" => Some(AuditAction::TransferFailed),
            "TRANSFER_CANCELED" => Some(AuditAction::TransferCanceled),
            _ => None,
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One immutable record of a single state event.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub action: AuditAction,
    /// Transfer id, denormalized as a string
    pub transfer_id: String,
    /// Transfer reference, denormalized
    #[schema(example = "TRF-20250101-A3B2")]
    pub transfer_reference: String,
    /// Context snapshot (amount/fees at creation, provider_ref on
    /// success, error_code on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        action: AuditAction,
        transfer_id: impl Into<String>,
        transfer_reference: impl Into<String>,
        metadata: Option<serde_json::Value>,
    ) -> Self {
        Self {
            action,
            transfer_id: transfer_id.into(),
            transfer_reference: transfer_reference.into(),
            metadata,
            created_at: Utc::now(),
        }
    }
}

/// Audit persistence error. Propagated to the caller, never swallowed.
#[derive(Error, Debug, Clone)]
pub enum AuditError {
    #[error("audit database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for AuditError {
    fn from(e: sqlx::Error) -> Self {
        AuditError::Database(e.to_string())
    }
}
