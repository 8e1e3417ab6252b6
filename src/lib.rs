//! Transfers API: a mobile money transfer service.
//!
//! Transfers are created PENDING, pushed through an external provider to
//! SUCCESS or FAILED, or canceled while still PENDING. Every state change
//! is recorded in an append-only audit trail.

pub mod audit;
pub mod auth;
pub mod config;
pub mod gateway;
pub mod logging;
pub mod transfers;

pub use config::AppConfig;
pub use transfers::{Transfer, TransferChannel, TransferError, TransferId, TransferStatus};
