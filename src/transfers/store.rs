//! Transfer persistence contract and the in-memory implementation.
//!
//! Pagination contract: ascending ID order (insertion-order surrogate),
//! opaque cursor = last returned ID, strictly-greater scan, `limit + 1`
//! probe to detect the next page in one round trip.

use std::collections::{BTreeMap, HashSet};
use std::ops::Bound;
use std::sync::RwLock;

use async_trait::async_trait;

use super::error::TransferError;
use super::status::{TransferChannel, TransferStatus};
use super::types::{Transfer, TransferId, TransferUpdate};

/// Conjunctive listing filter. Every field is optional; present fields
/// are ANDed together.
#[derive(Debug, Clone, Default)]
pub struct TransferQuery {
    pub status: Option<TransferStatus>,
    pub channel: Option<TransferChannel>,
    /// Inclusive lower bound on `amount`
    pub min_amount: Option<u64>,
    /// Inclusive upper bound on `amount`
    pub max_amount: Option<u64>,
    /// Case-insensitive substring over reference OR recipient name
    pub q: Option<String>,
    pub limit: Option<u32>,
    pub cursor: Option<TransferId>,
}

impl TransferQuery {
    pub const DEFAULT_LIMIT: u32 = 20;
    pub const MAX_LIMIT: u32 = 50;

    /// Requested page size, defaulted and hard-capped.
    pub fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT) as usize
    }

    /// Whether a transfer passes every present filter (cursor excluded).
    pub fn matches(&self, transfer: &Transfer) -> bool {
        if let Some(status) = self.status {
            if transfer.status != status {
                return false;
            }
        }
        if let Some(channel) = self.channel {
            if transfer.channel != channel {
                return false;
            }
        }
        if let Some(min) = self.min_amount {
            if transfer.amount < min {
                return false;
            }
        }
        if let Some(max) = self.max_amount {
            if transfer.amount > max {
                return false;
            }
        }
        if let Some(ref q) = self.q {
            let needle = q.to_lowercase();
            let in_reference = transfer.reference.to_lowercase().contains(&needle);
            let in_name = transfer.recipient.name.to_lowercase().contains(&needle);
            if !in_reference && !in_name {
                return false;
            }
        }
        true
    }
}

/// One page of results plus the cursor for the next one.
#[derive(Debug, Clone)]
pub struct TransferPage {
    pub items: Vec<Transfer>,
    /// ID of the last returned item when more rows exist, otherwise None
    pub next_cursor: Option<TransferId>,
}

/// Transfer persistence contract.
///
/// `update_if_status` is a compare-and-swap: the write lands only if the
/// stored status still equals `expected`, so at most one transition wins
/// when callers race.
#[async_trait]
pub trait TransferStore: Send + Sync {
    /// Persist a new transfer. A duplicate reference is an error; the
    /// unique constraint is the store's responsibility.
    async fn insert(&self, transfer: &Transfer) -> Result<(), TransferError>;

    async fn find_by_id(&self, id: TransferId) -> Result<Option<Transfer>, TransferError>;

    async fn find_by_reference(&self, reference: &str)
        -> Result<Option<Transfer>, TransferError>;

    /// Apply `update` only if the current status equals `expected`.
    /// Returns the updated transfer, or None if the precondition was lost
    /// (status moved concurrently, or the row is gone).
    async fn update_if_status(
        &self,
        id: TransferId,
        expected: TransferStatus,
        update: TransferUpdate,
    ) -> Result<Option<Transfer>, TransferError>;

    async fn find_with_pagination(
        &self,
        query: &TransferQuery,
    ) -> Result<TransferPage, TransferError>;
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Default)]
struct MemoryInner {
    transfers: BTreeMap<TransferId, Transfer>,
    references: HashSet<String>,
}

/// In-memory transfer store.
///
/// Backs the test suite and dev runs without PostgreSQL. The BTreeMap
/// gives the ascending-ID iteration the pagination contract needs.
#[derive(Default)]
pub struct MemoryTransferStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryTransferStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored transfers (test observability)
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().transfers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TransferStore for MemoryTransferStore {
    async fn insert(&self, transfer: &Transfer) -> Result<(), TransferError> {
        let mut inner = self.inner.write().unwrap();
        if !inner.references.insert(transfer.reference.clone()) {
            return Err(TransferError::DuplicateReference(transfer.reference.clone()));
        }
        inner.transfers.insert(transfer.id, transfer.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: TransferId) -> Result<Option<Transfer>, TransferError> {
        Ok(self.inner.read().unwrap().transfers.get(&id).cloned())
    }

    async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Transfer>, TransferError> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .transfers
            .values()
            .find(|t| t.reference == reference)
            .cloned())
    }

    async fn update_if_status(
        &self,
        id: TransferId,
        expected: TransferStatus,
        update: TransferUpdate,
    ) -> Result<Option<Transfer>, TransferError> {
        let mut inner = self.inner.write().unwrap();
        match inner.transfers.get_mut(&id) {
            Some(transfer) if transfer.status == expected => {
                transfer.status = update.status;
                if update.provider_ref.is_some() {
                    transfer.provider_ref = update.provider_ref;
                }
                if update.error_code.is_some() {
                    transfer.error_code = update.error_code;
                }
                transfer.updated_at = chrono::Utc::now();
                Ok(Some(transfer.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn find_with_pagination(
        &self,
        query: &TransferQuery,
    ) -> Result<TransferPage, TransferError> {
        let limit = query.effective_limit();
        let inner = self.inner.read().unwrap();

        let lower = match query.cursor {
            Some(cursor) => Bound::Excluded(cursor),
            None => Bound::Unbounded,
        };

        // limit + 1 probe: one extra row tells us whether a next page exists
        let mut items: Vec<Transfer> = inner
            .transfers
            .range((lower, Bound::Unbounded))
            .map(|(_, t)| t)
            .filter(|t| query.matches(t))
            .take(limit + 1)
            .cloned()
            .collect();

        let next_cursor = if items.len() > limit {
            items.truncate(limit);
            items.last().map(|t| t.id)
        } else {
            None
        };

        Ok(TransferPage { items, next_cursor })
    }
}
