//! Transfer status machine and payout channels.
//!
//! Status IDs are designed for PostgreSQL storage as SMALLINT.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle status of a transfer.
///
/// PENDING is the only status that accepts further transitions:
/// `process` moves it to PROCESSING then exactly one of SUCCESS/FAILED,
/// `cancel` moves it to CANCELED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum TransferStatus {
    /// Initial status - transfer recorded, nothing sent to the provider
    Pending = 0,

    /// Provider call in flight (durable before the call is made)
    Processing = 10,

    /// Terminal: provider confirmed, `provider_ref` set
    Success = 20,

    /// Terminal: provider rejected, `error_code` set
    Failed = -10,

    /// Terminal: canceled while still PENDING
    Canceled = -20,
}

impl TransferStatus {
    /// True if `process`/`cancel` must be rejected from this status.
    ///
    /// PROCESSING is not final but is also not re-enterable, so it counts.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransferStatus::Pending)
    }

    /// Numeric status ID for PostgreSQL storage
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    /// Convert from PostgreSQL status ID
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(TransferStatus::Pending),
            10 => Some(TransferStatus::Processing),
            20 => Some(TransferStatus::Success),
            -10 => Some(TransferStatus::Failed),
            -20 => Some(TransferStatus::Canceled),
            _ => None,
        }
    }

    /// Wire-format status name
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "PENDING",
            TransferStatus::Processing => "PROCESSING",
            TransferStatus::Success => "SUCCESS",
            TransferStatus::Failed => "FAILED",
            TransferStatus::Canceled => "CANCELED",
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<i16> for TransferStatus {
    type Error = ();

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        TransferStatus::from_id(value).ok_or(())
    }
}

/// Payout channel the recipient is reached on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum TransferChannel {
    Wave = 1,
    Om = 2,
}

impl TransferChannel {
    #[inline]
    pub fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(TransferChannel::Wave),
            2 => Some(TransferChannel::Om),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferChannel::Wave => "WAVE",
            TransferChannel::Om => "OM",
        }
    }
}

impl fmt::Display for TransferChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<i16> for TransferChannel {
    type Error = ();

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        TransferChannel::from_id(value).ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(!TransferStatus::Pending.is_terminal());

        assert!(TransferStatus::Processing.is_terminal());
        assert!(TransferStatus::Success.is_terminal());
        assert!(TransferStatus::Failed.is_terminal());
        assert!(TransferStatus::Canceled.is_terminal());
    }

    #[test]
    fn test_status_id_roundtrip() {
        let statuses = [
            TransferStatus::Pending,
            TransferStatus::Processing,
            TransferStatus::Success,
            TransferStatus::Failed,
            TransferStatus::Canceled,
        ];

        for status in statuses {
            let id = status.id();
            let recovered = TransferStatus::from_id(id).unwrap();
            assert_eq!(status, recovered);
        }
    }

    #[test]
    fn test_invalid_status_id() {
        assert!(TransferStatus::from_id(999).is_none());
        assert!(TransferStatus::from_id(-999).is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(TransferStatus::Pending.to_string(), "PENDING");
        assert_eq!(TransferStatus::Canceled.to_string(), "CANCELED");
        assert_eq!(TransferChannel::Wave.to_string(), "WAVE");
        assert_eq!(TransferChannel::Om.to_string(), "OM");
    }

    #[test]
    fn test_channel_id_roundtrip() {
        assert_eq!(TransferChannel::from_id(1), Some(TransferChannel::Wave));
        assert_eq!(TransferChannel::from_id(2), Some(TransferChannel::Om));
        assert_eq!(TransferChannel::from_id(0), None);
        assert_eq!(TransferChannel::from_id(3), None);
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_string(&TransferStatus::Processing).unwrap();
        assert_eq!(json, "\"PROCESSING\"");

        let channel: TransferChannel = serde_json::from_str("\"OM\"").unwrap();
        assert_eq!(channel, TransferChannel::Om);
    }
}
