//! Transfer lifecycle orchestration.
//!
//! PENDING -> PROCESSING -> {SUCCESS, FAILED}, plus PENDING -> CANCELED.
//! Every transition is a CAS against the store, so two racing callers can
//! never both move the same transfer; the loser observes a conflict.

use std::sync::Arc;

use serde_json::json;

use crate::audit::{AuditAction, AuditEntry, AuditRecorder};

use super::error::TransferError;
use super::fees::transfer_fee;
use super::provider::{ProviderGateway, ProviderOutcome};
use super::reference;
use super::status::TransferStatus;
use super::store::{TransferPage, TransferQuery, TransferStore};
use super::types::{NewTransfer, Transfer, TransferId, TransferUpdate};

pub struct TransferService {
    store: Arc<dyn TransferStore>,
    audit: Arc<AuditRecorder>,
    provider: Arc<dyn ProviderGateway>,
}

impl TransferService {
    pub fn new(
        store: Arc<dyn TransferStore>,
        audit: Arc<AuditRecorder>,
        provider: Arc<dyn ProviderGateway>,
    ) -> Self {
        Self {
            store,
            audit,
            provider,
        }
    }

    /// Create a transfer in PENDING state.
    ///
    /// Fees are computed server-side and never taken from the caller.
    pub async fn create(&self, req: NewTransfer) -> Result<Transfer, TransferError> {
        if req.amount == 0 {
            return Err(TransferError::InvalidAmount);
        }
        if req.currency.trim().is_empty() {
            return Err(TransferError::InvalidCurrency);
        }

        let fees = transfer_fee(req.amount);
        let transfer = Transfer::create(req, reference::generate(), fees)?;
        self.store.insert(&transfer).await?;

        self.audit
            .log(
                AuditAction::TransferCreated,
                &transfer.id.to_string(),
                &transfer.reference,
                Some(json!({
                    "amount": transfer.amount,
                    "fees": transfer.fees,
                    "total": transfer.total,
                })),
            )
            .await?;

        tracing::info!(
            transfer_id = %transfer.id,
            reference = %transfer.reference,
            amount = transfer.amount,
            fees = transfer.fees,
            "Transfer created"
        );

        Ok(transfer)
    }

    /// Run a PENDING transfer through the provider to a terminal state.
    ///
    /// The call blocks for the full provider round trip and returns the
    /// settled transfer. Any starting state other than PENDING is rejected.
    pub async fn process(&self, id: TransferId) -> Result<Transfer, TransferError> {
        let transfer = self.find_one(id).await?;
        if transfer.status != TransferStatus::Pending {
            return Err(TransferError::NotProcessable(transfer.status));
        }

        // Claim the transfer. A concurrent process/cancel loses here.
        let claimed = self
            .store
            .update_if_status(
                id,
                TransferStatus::Pending,
                TransferUpdate::status(TransferStatus::Processing),
            )
            .await?;
        let processing = match claimed {
            Some(t) => t,
            // CAS lost: re-read and report the state the winner moved us to
            None => {
                let current = self.find_one(id).await?;
                tracing::warn!(
                    transfer_id = %id,
                    status = current.status.as_str(),
                    "Concurrent transition won the PENDING claim"
                );
                return Err(TransferError::NotProcessable(current.status));
            }
        };

        self.audit
            .log(
                AuditAction::TransferProcessing,
                &processing.id.to_string(),
                &processing.reference,
                None,
            )
            .await?;

        let outcome = self
            .provider
            .process_transfer(processing.id, processing.amount)
            .await;

        let (update, action, metadata) = match outcome {
            ProviderOutcome::Success { provider_ref } => (
                TransferUpdate::success(provider_ref.clone()),
                AuditAction::TransferSuccess,
                json!({ "provider_ref": provider_ref }),
            ),
            ProviderOutcome::Failure { error_code } => (
                TransferUpdate::failed(error_code.clone()),
                AuditAction::TransferFailed,
                json!({ "error_code": error_code }),
            ),
        };

        // We own PROCESSING at this point, so the CAS only fails if
        // something rewrote the row out from under us.
        let settled = self
            .store
            .update_if_status(id, TransferStatus::Processing, update)
            .await?
            .ok_or_else(|| {
                TransferError::InvalidTransition(format!(
                    "transfer {} left PROCESSING during settlement",
                    id
                ))
            })?;

        self.audit
            .log(action, &settled.id.to_string(), &settled.reference, Some(metadata))
            .await?;

        tracing::info!(
            transfer_id = %settled.id,
            status = settled.status.as_str(),
            "Transfer settled"
        );

        Ok(settled)
    }

    /// Cancel a PENDING transfer. Terminal once canceled.
    pub async fn cancel(&self, id: TransferId) -> Result<Transfer, TransferError> {
        let transfer = self.find_one(id).await?;
        if transfer.status != TransferStatus::Pending {
            return Err(TransferError::NotCancelable(transfer.status));
        }

        let attempt = self
            .store
            .update_if_status(
                id,
                TransferStatus::Pending,
                TransferUpdate::status(TransferStatus::Canceled),
            )
            .await?;
        let canceled = match attempt {
            Some(t) => t,
            None => {
                let current = self.find_one(id).await?;
                tracing::warn!(
                    transfer_id = %id,
                    status = current.status.as_str(),
                    "Concurrent transition won the PENDING claim"
                );
                return Err(TransferError::NotCancelable(current.status));
            }
        };

        self.audit
            .log(
                AuditAction::TransferCanceled,
                &canceled.id.to_string(),
                &canceled.reference,
                None,
            )
            .await?;

        tracing::info!(transfer_id = %canceled.id, "Transfer canceled");

        Ok(canceled)
    }

    pub async fn find_one(&self, id: TransferId) -> Result<Transfer, TransferError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| TransferError::NotFound(id.to_string()))
    }

    pub async fn find_all(&self, query: &TransferQuery) -> Result<TransferPage, TransferError> {
        self.store.find_with_pagination(query).await
    }

    /// Audit trail for one transfer, newest first
    pub async fn audit_trail(&self, id: TransferId) -> Result<Vec<AuditEntry>, TransferError> {
        // 404 for unknown ids rather than an empty trail
        self.find_one(id).await?;
        Ok(self.audit.transfer_logs(&id.to_string()).await?)
    }
}
