//! PostgreSQL persistence for transfers.
//!
//! All queries are runtime-bound; state transitions go through an atomic
//! CAS (Compare-And-Swap) UPDATE so concurrent workers cannot both win
//! the same transition.

use async_trait::async_trait;
use sqlx::{PgPool, QueryBuilder, Row};

use super::error::TransferError;
use super::status::{TransferChannel, TransferStatus};
use super::store::{TransferPage, TransferQuery, TransferStore};
use super::types::{Recipient, Transfer, TransferId, TransferUpdate};

const CREATE_TRANSFERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS transfers_tb (
    transfer_id     TEXT PRIMARY KEY,
    reference       TEXT NOT NULL UNIQUE,
    amount          BIGINT NOT NULL,
    currency        TEXT NOT NULL,
    channel         SMALLINT NOT NULL,
    recipient_phone TEXT NOT NULL,
    recipient_name  TEXT NOT NULL,
    metadata        JSONB,
    fees            BIGINT NOT NULL,
    total           BIGINT NOT NULL,
    status          SMALLINT NOT NULL,
    provider_ref    TEXT,
    error_code      TEXT,
    created_at      TIMESTAMPTZ NOT NULL,
    updated_at      TIMESTAMPTZ NOT NULL
)
"#;

const CREATE_AUDIT_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS audit_logs_tb (
    id                 BIGSERIAL PRIMARY KEY,
    action             TEXT NOT NULL,
    transfer_id        TEXT NOT NULL,
    transfer_reference TEXT NOT NULL,
    metadata           JSONB,
    created_at         TIMESTAMPTZ NOT NULL
)
"#;

const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_transfers_status ON transfers_tb (status)",
    "CREATE INDEX IF NOT EXISTS idx_transfers_channel ON transfers_tb (channel)",
    "CREATE INDEX IF NOT EXISTS idx_transfers_amount ON transfers_tb (amount)",
    "CREATE INDEX IF NOT EXISTS idx_transfers_created_at ON transfers_tb (created_at)",
    "CREATE INDEX IF NOT EXISTS idx_audit_transfer_id ON audit_logs_tb (transfer_id)",
];

/// Create the transfer and audit tables if they do not exist
pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_TRANSFERS_TABLE).execute(pool).await?;
    sqlx::query(CREATE_AUDIT_TABLE).execute(pool).await?;
    for stmt in CREATE_INDEXES {
        sqlx::query(stmt).execute(pool).await?;
    }
    tracing::info!("Database schema ready");
    Ok(())
}

/// PostgreSQL-backed transfer store
pub struct PgTransferStore {
    pool: PgPool,
}

impl PgTransferStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_transfer(row: &sqlx::postgres::PgRow) -> Result<Transfer, TransferError> {
        let id_str: String = row.get("transfer_id");
        let id: TransferId = id_str
            .parse()
            .map_err(|_| TransferError::Database(format!("invalid transfer_id: {}", id_str)))?;

        let status_id: i16 = row.get("status");
        let status = TransferStatus::from_id(status_id)
            .ok_or_else(|| TransferError::Database(format!("invalid status id: {}", status_id)))?;

        let channel_id: i16 = row.get("channel");
        let channel = TransferChannel::from_id(channel_id).ok_or_else(|| {
            TransferError::Database(format!("invalid channel id: {}", channel_id))
        })?;

        let metadata: Option<serde_json::Value> = row.get("metadata");
        let metadata = match metadata {
            Some(serde_json::Value::Object(map)) => Some(map),
            Some(other) => {
                return Err(TransferError::Database(format!(
                    "metadata is not a JSON object: {}",
                    other
                )))
            }
            None => None,
        };

        Ok(Transfer {
            id,
            reference: row.get("reference"),
            amount: row.get::<i64, _>("amount") as u64,
            currency: row.get("currency"),
            channel,
            recipient: Recipient {
                phone: row.get("recipient_phone"),
                name: row.get("recipient_name"),
            },
            metadata,
            fees: row.get::<i64, _>("fees") as u64,
            total: row.get::<i64, _>("total") as u64,
            status,
            provider_ref: row.get("provider_ref"),
            error_code: row.get("error_code"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

/// Escape LIKE metacharacters so `q` always matches as a literal
/// substring, same as the in-memory store
fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

const SELECT_COLUMNS: &str = r#"
SELECT transfer_id, reference, amount, currency, channel,
       recipient_phone, recipient_name, metadata, fees, total,
       status, provider_ref, error_code, created_at, updated_at
FROM transfers_tb
"#;

#[async_trait]
impl TransferStore for PgTransferStore {
    async fn insert(&self, transfer: &Transfer) -> Result<(), TransferError> {
        sqlx::query(
            r#"
            INSERT INTO transfers_tb
                (transfer_id, reference, amount, currency, channel,
                 recipient_phone, recipient_name, metadata, fees, total,
                 status, provider_ref, error_code, created_at, updated_at)
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(transfer.id.to_string())
        .bind(&transfer.reference)
        .bind(transfer.amount as i64)
        .bind(&transfer.currency)
        .bind(transfer.channel.id())
        .bind(&transfer.recipient.phone)
        .bind(&transfer.recipient.name)
        .bind(transfer.metadata.clone().map(serde_json::Value::Object))
        .bind(transfer.fees as i64)
        .bind(transfer.total as i64)
        .bind(transfer.status.id())
        .bind(&transfer.provider_ref)
        .bind(&transfer.error_code)
        .bind(transfer.created_at)
        .bind(transfer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: TransferId) -> Result<Option<Transfer>, TransferError> {
        let row = sqlx::query(&format!("{} WHERE transfer_id = $1", SELECT_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_transfer(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Transfer>, TransferError> {
        let row = sqlx::query(&format!("{} WHERE reference = $1", SELECT_COLUMNS))
            .bind(reference)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_transfer(&row)?)),
            None => Ok(None),
        }
    }

    async fn update_if_status(
        &self,
        id: TransferId,
        expected: TransferStatus,
        update: TransferUpdate,
    ) -> Result<Option<Transfer>, TransferError> {
        let row = sqlx::query(
            r#"
            UPDATE transfers_tb
            SET status = $1,
                provider_ref = COALESCE($2, provider_ref),
                error_code = COALESCE($3, error_code),
                updated_at = NOW()
            WHERE transfer_id = $4 AND status = $5
            RETURNING transfer_id, reference, amount, currency, channel,
                      recipient_phone, recipient_name, metadata, fees, total,
                      status, provider_ref, error_code, created_at, updated_at
            "#,
        )
        .bind(update.status.id())
        .bind(&update.provider_ref)
        .bind(&update.error_code)
        .bind(id.to_string())
        .bind(expected.id())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Self::row_to_transfer(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_with_pagination(
        &self,
        query: &TransferQuery,
    ) -> Result<TransferPage, TransferError> {
        let limit = query.effective_limit();

        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(SELECT_COLUMNS);
        builder.push(" WHERE 1=1");

        if let Some(status) = query.status {
            builder.push(" AND status = ").push_bind(status.id());
        }
        if let Some(channel) = query.channel {
            builder.push(" AND channel = ").push_bind(channel.id());
        }
        if let Some(min) = query.min_amount {
            builder.push(" AND amount >= ").push_bind(min as i64);
        }
        if let Some(max) = query.max_amount {
            builder.push(" AND amount <= ").push_bind(max as i64);
        }
        if let Some(ref q) = query.q {
            let pattern = format!("%{}%", escape_like(q));
            builder
                .push(" AND (reference ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR recipient_name ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(cursor) = query.cursor {
            builder
                .push(" AND transfer_id > ")
                .push_bind(cursor.to_string());
        }

        // ULIDs sort lexicographically in creation order, so ordering by
        // transfer_id gives a stable insertion-order walk
        builder.push(" ORDER BY transfer_id ASC LIMIT ");
        builder.push_bind((limit + 1) as i64);

        let rows = builder.build().fetch_all(&self.pool).await?;

        let mut items = Vec::with_capacity(rows.len().min(limit));
        for row in rows.iter().take(limit) {
            items.push(Self::row_to_transfer(row)?);
        }
        let next_cursor = if rows.len() > limit {
            items.last().map(|t| t.id)
        } else {
            None
        };

        Ok(TransferPage { items, next_cursor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_neutralizes_metacharacters() {
        assert_eq!(escape_like("jane"), "jane");
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("c:\\temp"), "c:\\\\temp");
        assert_eq!(escape_like("%_%"), "\\%\\_\\%");
    }
}
