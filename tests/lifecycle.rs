//! End-to-end lifecycle tests over the in-memory stores with a scripted
//! provider, covering creation, settlement, cancellation, conflicts,
//! pagination and the audit trail.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use transfers_api::audit::{AuditAction, AuditRecorder, AuditStore, MemoryAuditStore};
use transfers_api::transfers::fees::transfer_fee;
use transfers_api::transfers::{
    MemoryTransferStore, NewTransfer, ProviderGateway, ProviderOutcome, Recipient, Transfer,
    TransferChannel, TransferError, TransferId, TransferQuery, TransferService, TransferStatus,
};

/// Provider that replays a queue of pre-scripted outcomes
struct ScriptedProvider {
    outcomes: Mutex<VecDeque<ProviderOutcome>>,
}

impl ScriptedProvider {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(VecDeque::new()),
        })
    }

    fn push(&self, outcome: ProviderOutcome) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }
}

#[async_trait]
impl ProviderGateway for ScriptedProvider {
    async fn process_transfer(&self, _id: TransferId, _amount: u64) -> ProviderOutcome {
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted outcome left")
    }
}

struct TestHarness {
    service: TransferService,
    store: Arc<MemoryTransferStore>,
    audit_store: Arc<MemoryAuditStore>,
    provider: Arc<ScriptedProvider>,
}

impl TestHarness {
    fn new() -> Self {
        let store = Arc::new(MemoryTransferStore::new());
        let audit_store = Arc::new(MemoryAuditStore::new());
        let provider = ScriptedProvider::new();
        let service = TransferService::new(
            store.clone(),
            Arc::new(AuditRecorder::new(audit_store.clone())),
            provider.clone(),
        );
        Self {
            service,
            store,
            audit_store,
            provider,
        }
    }

    async fn create(&self, amount: u64, channel: TransferChannel, name: &str) -> Transfer {
        self.service
            .create(NewTransfer {
                amount,
                currency: "XOF".to_string(),
                channel,
                recipient: Recipient {
                    phone: "+221771234567".to_string(),
                    name: name.to_string(),
                },
                metadata: None,
            })
            .await
            .expect("create failed")
    }

    /// Audit actions for one transfer, oldest first
    async fn actions(&self, id: TransferId) -> Vec<AuditAction> {
        let mut entries = self
            .audit_store
            .for_transfer(&id.to_string())
            .await
            .unwrap();
        entries.reverse();
        entries.into_iter().map(|e| e.action).collect()
    }
}

// ============================================================================
// Creation
// ============================================================================

#[tokio::test]
async fn test_create_computes_fee_and_total() {
    let h = TestHarness::new();
    let transfer = h.create(50_000, TransferChannel::Wave, "Jane Doe").await;

    assert_eq!(transfer.status, TransferStatus::Pending);
    assert_eq!(transfer.fees, transfer_fee(50_000));
    assert_eq!(transfer.fees, 400);
    assert_eq!(transfer.total, 50_400);
    assert!(transfer.reference.starts_with("TRF-"));
    assert!(transfer.provider_ref.is_none());
    assert!(transfer.error_code.is_none());
    assert_eq!(transfer.created_at, transfer.updated_at);
}

#[tokio::test]
async fn test_create_writes_audit_snapshot() {
    let h = TestHarness::new();
    let transfer = h.create(50_000, TransferChannel::Om, "Jane Doe").await;

    let entries = h
        .audit_store
        .for_transfer(&transfer.id.to_string())
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, AuditAction::TransferCreated);
    assert_eq!(entries[0].transfer_reference, transfer.reference);

    let metadata = entries[0].metadata.as_ref().unwrap();
    assert_eq!(metadata["amount"], 50_000);
    assert_eq!(metadata["fees"], 400);
    assert_eq!(metadata["total"], 50_400);
}

#[tokio::test]
async fn test_create_rejects_zero_amount() {
    let h = TestHarness::new();
    let err = h
        .service
        .create(NewTransfer {
            amount: 0,
            currency: "XOF".to_string(),
            channel: TransferChannel::Wave,
            recipient: Recipient {
                phone: "+221771234567".to_string(),
                name: "Jane Doe".to_string(),
            },
            metadata: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::InvalidAmount));
    assert!(h.store.is_empty());
    assert!(h.audit_store.is_empty());
}

#[tokio::test]
async fn test_create_rejects_amount_overflowing_total() {
    let h = TestHarness::new();
    let err = h
        .service
        .create(NewTransfer {
            amount: u64::MAX,
            currency: "XOF".to_string(),
            channel: TransferChannel::Wave,
            recipient: Recipient {
                phone: "+221771234567".to_string(),
                name: "Jane Doe".to_string(),
            },
            metadata: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::InvalidAmount));
    assert!(h.store.is_empty());
    assert!(h.audit_store.is_empty());
}

// ============================================================================
// Processing
// ============================================================================

#[tokio::test]
async fn test_process_success_path() {
    let h = TestHarness::new();
    let transfer = h.create(100_000, TransferChannel::Wave, "Jane Doe").await;
    h.provider.push(ProviderOutcome::Success {
        provider_ref: "PROV-1724900000000-AB12CD".to_string(),
    });

    let settled = h.service.process(transfer.id).await.unwrap();
    assert_eq!(settled.status, TransferStatus::Success);
    assert_eq!(
        settled.provider_ref.as_deref(),
        Some("PROV-1724900000000-AB12CD")
    );
    assert!(settled.error_code.is_none());

    assert_eq!(
        h.actions(transfer.id).await,
        vec![
            AuditAction::TransferCreated,
            AuditAction::TransferProcessing,
            AuditAction::TransferSuccess,
        ]
    );
}

#[tokio::test]
async fn test_process_failure_path() {
    let h = TestHarness::new();
    let transfer = h.create(100_000, TransferChannel::Om, "Jane Doe").await;
    h.provider.push(ProviderOutcome::Failure {
        error_code: "INSUFFICIENT_FUNDS".to_string(),
    });

    let settled = h.service.process(transfer.id).await.unwrap();
    assert_eq!(settled.status, TransferStatus::Failed);
    assert_eq!(settled.error_code.as_deref(), Some("INSUFFICIENT_FUNDS"));
    assert!(settled.provider_ref.is_none());

    let entries = h
        .audit_store
        .for_transfer(&transfer.id.to_string())
        .await
        .unwrap();
    // Newest first: the failure entry carries the error code
    assert_eq!(entries[0].action, AuditAction::TransferFailed);
    assert_eq!(
        entries[0].metadata.as_ref().unwrap()["error_code"],
        "INSUFFICIENT_FUNDS"
    );
}

#[tokio::test]
async fn test_process_terminal_transfer_conflicts() {
    let h = TestHarness::new();
    let transfer = h.create(100_000, TransferChannel::Wave, "Jane Doe").await;
    h.provider.push(ProviderOutcome::Success {
        provider_ref: "PROV-1-ABCDEF".to_string(),
    });
    h.service.process(transfer.id).await.unwrap();

    let audit_before = h.audit_store.len();
    let err = h.service.process(transfer.id).await.unwrap_err();
    assert!(matches!(
        err,
        TransferError::NotProcessable(TransferStatus::Success)
    ));
    assert_eq!(err.code(), "STATUS_CONFLICT");
    assert_eq!(err.http_status().as_u16(), 409);

    // The rejected attempt left no trace
    assert_eq!(h.audit_store.len(), audit_before);
    let current = h.service.find_one(transfer.id).await.unwrap();
    assert_eq!(current.status, TransferStatus::Success);
}

#[tokio::test]
async fn test_process_unknown_transfer_is_not_found() {
    let h = TestHarness::new();
    let err = h.service.process(TransferId::new()).await.unwrap_err();
    assert!(matches!(err, TransferError::NotFound(_)));
    assert_eq!(err.http_status().as_u16(), 404);
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn test_cancel_pending_transfer() {
    let h = TestHarness::new();
    let transfer = h.create(25_000, TransferChannel::Om, "Jane Doe").await;

    let canceled = h.service.cancel(transfer.id).await.unwrap();
    assert_eq!(canceled.status, TransferStatus::Canceled);
    assert_eq!(
        h.actions(transfer.id).await,
        vec![AuditAction::TransferCreated, AuditAction::TransferCanceled]
    );
}

#[tokio::test]
async fn test_cancel_is_terminal() {
    let h = TestHarness::new();
    let transfer = h.create(25_000, TransferChannel::Wave, "Jane Doe").await;
    h.service.cancel(transfer.id).await.unwrap();

    // Neither cancel nor process can touch it afterwards
    let err = h.service.cancel(transfer.id).await.unwrap_err();
    assert!(matches!(
        err,
        TransferError::NotCancelable(TransferStatus::Canceled)
    ));

    let err = h.service.process(transfer.id).await.unwrap_err();
    assert!(matches!(
        err,
        TransferError::NotProcessable(TransferStatus::Canceled)
    ));
}

#[tokio::test]
async fn test_cancel_settled_transfer_conflicts() {
    let h = TestHarness::new();
    let transfer = h.create(25_000, TransferChannel::Wave, "Jane Doe").await;
    h.provider.push(ProviderOutcome::Failure {
        error_code: "TIMEOUT".to_string(),
    });
    h.service.process(transfer.id).await.unwrap();

    let err = h.service.cancel(transfer.id).await.unwrap_err();
    assert!(matches!(
        err,
        TransferError::NotCancelable(TransferStatus::Failed)
    ));
    assert_eq!(err.http_status().as_u16(), 409);
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_cursor_walk_covers_everything_once() {
    let h = TestHarness::new();
    let mut expected = Vec::new();
    for i in 0..25 {
        let t = h
            .create(10_000, TransferChannel::Wave, &format!("Client {}", i))
            .await;
        expected.push(t.id);
    }

    let first = h
        .service
        .find_all(&TransferQuery::default())
        .await
        .unwrap();
    assert_eq!(first.items.len(), 20);
    let cursor = first.next_cursor.expect("more pages expected");

    let second = h
        .service
        .find_all(&TransferQuery {
            cursor: Some(cursor),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(second.items.len(), 5);
    assert!(second.next_cursor.is_none());

    let seen: Vec<TransferId> = first
        .items
        .iter()
        .chain(second.items.iter())
        .map(|t| t.id)
        .collect();
    expected.sort();
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn test_filters_are_conjunctive() {
    let h = TestHarness::new();
    for i in 0..6 {
        let channel = if i % 2 == 0 {
            TransferChannel::Wave
        } else {
            TransferChannel::Om
        };
        let t = h.create(10_000 + i * 10_000, channel, "Client").await;
        if i < 2 {
            h.provider.push(ProviderOutcome::Success {
                provider_ref: format!("PROV-{}-AAAAAA", i),
            });
            h.service.process(t.id).await.unwrap();
        }
    }

    let page = h
        .service
        .find_all(&TransferQuery {
            status: Some(TransferStatus::Success),
            channel: Some(TransferChannel::Wave),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].amount, 10_000);

    let page = h
        .service
        .find_all(&TransferQuery {
            min_amount: Some(30_000),
            max_amount: Some(50_000),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.items.len(), 3);
}

#[tokio::test]
async fn test_free_text_search_matches_recipient_name() {
    let h = TestHarness::new();
    h.create(10_000, TransferChannel::Wave, "Jane Doe").await;
    h.create(10_000, TransferChannel::Wave, "John Smith").await;

    let page = h
        .service
        .find_all(&TransferQuery {
            q: Some("JANE".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].recipient.name, "Jane Doe");
}

// ============================================================================
// Audit trail
// ============================================================================

#[tokio::test]
async fn test_audit_trail_newest_first() {
    let h = TestHarness::new();
    let transfer = h.create(10_000, TransferChannel::Om, "Jane Doe").await;
    h.provider.push(ProviderOutcome::Success {
        provider_ref: "PROV-1-ABCDEF".to_string(),
    });
    h.service.process(transfer.id).await.unwrap();

    let trail = h.service.audit_trail(transfer.id).await.unwrap();
    assert_eq!(trail.len(), 3);
    assert_eq!(trail[0].action, AuditAction::TransferSuccess);
    assert_eq!(trail[2].action, AuditAction::TransferCreated);
}

#[tokio::test]
async fn test_audit_trail_for_unknown_transfer_is_not_found() {
    let h = TestHarness::new();
    let err = h.service.audit_trail(TransferId::new()).await.unwrap_err();
    assert!(matches!(err, TransferError::NotFound(_)));
}
