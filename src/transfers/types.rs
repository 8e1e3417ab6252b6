//! Transfer core types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::TransferError;
use super::status::{TransferChannel, TransferStatus};

/// Open-ended key/value context attached by the caller. Opaque to the core.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Transfer ID type - ULID-based unique identifier
///
/// ULIDs are time-ordered and need no coordination, so ascending ID order
/// doubles as a stable insertion-order surrogate for pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ToSchema)]
#[schema(value_type = String, example = "01JGXQ2Z4V8F6YBKQ3T0M5W9RD")]
pub struct TransferId(ulid::Ulid);

impl TransferId {
    /// Generate a new unique TransferId
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    /// Get the inner ULID value
    pub fn inner(&self) -> ulid::Ulid {
        self.0
    }
}

impl Default for TransferId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TransferId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(ulid::Ulid::from_string(s)?))
    }
}

impl Serialize for TransferId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TransferId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Person receiving the payout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Recipient {
    /// Phone number in international format
    #[schema(example = "+221770000000")]
    pub phone: String,
    /// Display name, also matched by the free-text `q` filter
    #[schema(example = "Jane Doe")]
    pub name: String,
}

/// One money-transfer request tracked through its lifecycle.
///
/// `fees` and `total` are fixed at creation and never recomputed. After
/// creation only `status`, `provider_ref`, `error_code` and `updated_at`
/// ever change.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Transfer {
    /// Unique transfer ID (ULID, also the DB primary key)
    pub id: TransferId,
    /// Human-readable unique reference, `TRF-YYYYMMDD-XXXX`
    #[schema(example = "TRF-20250101-A3B2")]
    pub reference: String,
    /// Amount in whole currency units
    #[schema(example = 12500)]
    pub amount: u64,
    /// Currency code, free-form
    #[schema(example = "XOF")]
    pub currency: String,
    /// Payout channel
    pub channel: TransferChannel,
    pub recipient: Recipient,
    /// Caller-supplied context, opaque to the core
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Metadata>,
    /// Fees computed at creation, immutable thereafter
    #[schema(example = 100)]
    pub fees: u64,
    /// `amount + fees`, fixed at creation
    #[schema(example = 12600)]
    pub total: u64,
    pub status: TransferStatus,
    /// Provider reference, set only on transition to SUCCESS
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_ref: Option<String>,
    /// Provider error code, set only on transition to FAILED
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a transfer.
#[derive(Debug, Clone)]
pub struct NewTransfer {
    pub amount: u64,
    pub currency: String,
    pub channel: TransferChannel,
    pub recipient: Recipient,
    pub metadata: Option<Metadata>,
}

impl Transfer {
    /// Build a PENDING transfer with fees and total fixed from `amount`.
    ///
    /// Rejects amounts where `amount + fees` would overflow u64.
    pub fn create(req: NewTransfer, reference: String, fees: u64) -> Result<Self, TransferError> {
        let total = req
            .amount
            .checked_add(fees)
            .ok_or(TransferError::InvalidAmount)?;
        let now = Utc::now();

        Ok(Self {
            id: TransferId::new(),
            reference,
            amount: req.amount,
            currency: req.currency,
            channel: req.channel,
            recipient: req.recipient,
            metadata: req.metadata,
            fees,
            total,
            status: TransferStatus::Pending,
            provider_ref: None,
            error_code: None,
            created_at: now,
            updated_at: now,
        })
    }
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transfer[{}] {} {} {} -> {} status={}",
            self.id, self.reference, self.amount, self.currency, self.recipient.phone, self.status
        )
    }
}

/// Partial update applied on a status transition.
///
/// Everything else on the record is immutable post-creation.
#[derive(Debug, Clone)]
pub struct TransferUpdate {
    pub status: TransferStatus,
    pub provider_ref: Option<String>,
    pub error_code: Option<String>,
}

impl TransferUpdate {
    pub fn status(status: TransferStatus) -> Self {
        Self {
            status,
            provider_ref: None,
            error_code: None,
        }
    }

    pub fn success(provider_ref: String) -> Self {
        Self {
            status: TransferStatus::Success,
            provider_ref: Some(provider_ref),
            error_code: None,
        }
    }

    pub fn failed(error_code: String) -> Self {
        Self {
            status: TransferStatus::Failed,
            provider_ref: None,
            error_code: Some(error_code),
        }
    }
}
