//! Audit persistence.
//!
//! The store is append-only: there is no update or delete path by
//! construction. Two implementations share the contract, PostgreSQL for
//! deployments and an in-memory store for tests and storeless dev runs.

use std::sync::RwLock;

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use super::types::{AuditAction, AuditEntry, AuditError};

/// Append-only audit storage contract.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Append one immutable entry.
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditError>;

    /// All entries for a transfer, most recent first.
    async fn for_transfer(&self, transfer_id: &str) -> Result<Vec<AuditEntry>, AuditError>;
}

// ============================================================================
// In-memory store
// ============================================================================

/// In-memory audit store. Backs tests and runs without PostgreSQL.
#[derive(Default)]
pub struct MemoryAuditStore {
    entries: RwLock<Vec<AuditEntry>>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of entries across all transfers (test observability)
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        self.entries.write().unwrap().push(entry.clone());
        Ok(())
    }

    async fn for_transfer(&self, transfer_id: &str) -> Result<Vec<AuditEntry>, AuditError> {
        let entries = self.entries.read().unwrap();
        let mut matched: Vec<AuditEntry> = entries
            .iter()
            .filter(|e| e.transfer_id == transfer_id)
            .cloned()
            .collect();

        // Newest first; reverse before the stable sort so entries sharing
        // a timestamp keep reverse insertion order
        matched.reverse();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matched)
    }
}

// ============================================================================
// PostgreSQL store
// ============================================================================

/// PostgreSQL audit store over `audit_logs_tb`.
pub struct PgAuditStore {
    pool: PgPool,
}

impl PgAuditStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_entry(row: &sqlx::postgres::PgRow) -> Result<AuditEntry, AuditError> {
        let action_str: String = row.get("action");
        let action = AuditAction::parse(&action_str)
            .ok_or_else(|| AuditError::Database(format!("invalid audit action: {}", action_str)))?;

        Ok(AuditEntry {
            action,
            transfer_id: row.get("transfer_id"),
            transfer_reference: row.get("transfer_reference"),
            metadata: row.get("metadata"),
            created_at: row.get("created_at"),
        })
    }
}

#[async_trait]
impl AuditStore for PgAuditStore {
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs_tb (action, transfer_id, transfer_reference, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(entry.action.as_str())
        .bind(&entry.transfer_id)
        .bind(&entry.transfer_reference)
        .bind(&entry.metadata)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn for_transfer(&self, transfer_id: &str) -> Result<Vec<AuditEntry>, AuditError> {
        let rows = sqlx::query(
            r#"
            SELECT action, transfer_id, transfer_reference, metadata, created_at
            FROM audit_logs_tb
            WHERE transfer_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(transfer_id)
        .fetch_all(&self.pool)
        .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            entries.push(Self::row_to_entry(&row)?);
        }
        Ok(entries)
    }
}
