//! Money transfer lifecycle.
//!
//! A transfer moves through a small FSM:
//!
//! ```text
//! PENDING --> PROCESSING --> SUCCESS
//!    |             |
//!    |             +-------> FAILED
//!    +--> CANCELED
//! ```
//!
//! [`service::TransferService`] orchestrates the lifecycle over three
//! seams: a [`store::TransferStore`] for persistence, an
//! [`provider::ProviderGateway`] for the external payout, and the audit
//! recorder for the append-only trail.

pub mod db;
pub mod error;
pub mod fees;
pub mod provider;
pub mod reference;
pub mod service;
pub mod status;
pub mod store;
pub mod types;

pub use error::{ErrorBody, TransferError};
pub use provider::{ProviderGateway, ProviderOutcome, SimulatedProvider};
pub use service::TransferService;
pub use status::{TransferChannel, TransferStatus};
pub use store::{MemoryTransferStore, TransferPage, TransferQuery, TransferStore};
pub use types::{NewTransfer, Recipient, Transfer, TransferId, TransferUpdate};
