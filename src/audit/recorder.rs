//! Audit recorder.

use std::sync::Arc;

use tracing::info;

use super::store::AuditStore;
use super::types::{AuditAction, AuditEntry, AuditError};

/// Appends audit entries and serves per-transfer history.
///
/// Persistence errors bubble up to the caller; the recorder never fails
/// silently and never rolls back the status write it is paired with.
pub struct AuditRecorder {
    store: Arc<dyn AuditStore>,
}

impl AuditRecorder {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Record one lifecycle event.
    pub async fn log(
        &self,
        action: AuditAction,
        transfer_id: &str,
        transfer_reference: &str,
        metadata: Option<serde_json::Value>,
    ) -> Result<(), AuditError> {
        let entry = AuditEntry::new(action, transfer_id, transfer_reference, metadata.clone());
        self.store.append(&entry).await?;

        info!(
            action = %action,
            reference = %transfer_reference,
            metadata = ?metadata,
            "audit entry recorded"
        );
        Ok(())
    }

    /// All entries for a transfer, most recent first.
    pub async fn transfer_logs(&self, transfer_id: &str) -> Result<Vec<AuditEntry>, AuditError> {
        self.store.for_transfer(transfer_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::store::MemoryAuditStore;

    #[tokio::test]
    async fn test_log_appends_one_entry() {
        let store = Arc::new(MemoryAuditStore::new());
        let recorder = AuditRecorder::new(store.clone());

        recorder
            .log(
                AuditAction::TransferCreated,
                "id-1",
                "TRF-20250101-0001",
                Some(serde_json::json!({ "amount": 10000, "fees": 100, "total": 10100 })),
            )
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        let entries = recorder.transfer_logs("id-1").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].transfer_reference, "TRF-20250101-0001");
        assert_eq!(entries[0].metadata.as_ref().unwrap()["fees"], 100);
    }
}
