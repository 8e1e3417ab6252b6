//! Immutable audit trail of transfer lifecycle events.
//!
//! Every durable status change on a transfer is paired with exactly one
//! audit entry. Entries are append-only: never mutated, never deleted.
//! Linkage to the transfer is by value (id + reference strings), not by
//! reference, so the trail survives whatever happens to the transfer row.

pub mod recorder;
pub mod store;
pub mod types;

pub use recorder::AuditRecorder;
pub use store::{AuditStore, MemoryAuditStore, PgAuditStore};
pub use types::{AuditAction, AuditEntry, AuditError};
