//! HTTP handlers for the transfer API.
//!
//! Request validation happens here at the boundary; the service layer
//! re-checks the business rules it owns (amount, currency, state guards).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::audit::AuditEntry;
use crate::transfers::types::Metadata;
use crate::transfers::{
    NewTransfer, Recipient, Transfer, TransferChannel, TransferError, TransferId, TransferQuery,
    TransferStatus,
};

use super::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecipientBody {
    /// Recipient phone number, e.g. "+221771234567"
    #[validate(length(min = 1, message = "phone must not be empty"))]
    pub phone: String,
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTransferBody {
    /// Amount in whole currency units
    #[validate(range(min = 1, message = "amount must be greater than zero"))]
    pub amount: u64,
    /// ISO currency code, e.g. "XOF"
    #[validate(length(min = 1, message = "currency must not be empty"))]
    pub currency: String,
    pub channel: TransferChannel,
    #[validate(nested)]
    pub recipient: RecipientBody,
    /// Free-form JSON object carried through unchanged
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListTransfersQuery {
    pub status: Option<TransferStatus>,
    pub channel: Option<TransferChannel>,
    /// Inclusive lower bound on amount
    pub min_amount: Option<u64>,
    /// Inclusive upper bound on amount
    pub max_amount: Option<u64>,
    /// Case-insensitive search over reference and recipient name
    pub q: Option<String>,
    /// Page size, 1 to 50, default 20
    #[validate(range(min = 1, max = 50, message = "limit must be between 1 and 50"))]
    pub limit: Option<u32>,
    /// Opaque cursor from a previous page's `nextCursor`
    pub cursor: Option<String>,
}

impl ListTransfersQuery {
    fn into_query(self) -> Result<TransferQuery, TransferError> {
        let cursor = match self.cursor {
            Some(raw) => Some(
                raw.parse::<TransferId>()
                    .map_err(|_| TransferError::Validation(format!("invalid cursor: {}", raw)))?,
            ),
            None => None,
        };
        Ok(TransferQuery {
            status: self.status,
            channel: self.channel,
            min_amount: self.min_amount,
            max_amount: self.max_amount,
            q: self.q,
            limit: self.limit,
            cursor,
        })
    }
}

/// One page of transfers. `nextCursor` is null on the last page.
#[derive(Debug, Serialize, ToSchema)]
pub struct TransferListResponse {
    pub items: Vec<Transfer>,
    #[serde(rename = "nextCursor")]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: &'static str,
    #[schema(example = "0.1.0")]
    pub version: &'static str,
    /// Server timestamp in milliseconds
    pub timestamp_ms: i64,
}

/// Malformed IDs cannot name an existing transfer, so they read as 404
/// rather than leaking the ID format to probing clients
fn parse_id(raw: &str) -> Result<TransferId, TransferError> {
    raw.parse::<TransferId>()
        .map_err(|_| TransferError::NotFound(raw.to_string()))
}

// ============================================================================
// Handlers
// ============================================================================

/// Liveness probe, no auth required
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse)
    ),
    tag = "System"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp_ms: chrono::Utc::now().timestamp_millis(),
    })
}

/// Create a transfer in PENDING state
#[utoipa::path(
    post,
    path = "/transfers",
    request_body = CreateTransferBody,
    responses(
        (status = 201, description = "Transfer created", body = Transfer),
        (status = 400, description = "Validation failed", body = crate::transfers::ErrorBody),
        (status = 401, description = "Missing API key"),
        (status = 403, description = "Invalid API key")
    ),
    security(("api_key" = [])),
    tag = "Transfers"
)]
pub async fn create_transfer(
    State(state): State<AppState>,
    Json(body): Json<CreateTransferBody>,
) -> Result<(StatusCode, Json<Transfer>), TransferError> {
    body.validate()
        .map_err(|e| TransferError::Validation(e.to_string()))?;

    let transfer = state
        .service
        .create(NewTransfer {
            amount: body.amount,
            currency: body.currency,
            channel: body.channel,
            recipient: Recipient {
                phone: body.recipient.phone,
                name: body.recipient.name,
            },
            metadata: body.metadata,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(transfer)))
}

/// List transfers with filters and cursor pagination
#[utoipa::path(
    get,
    path = "/transfers",
    params(ListTransfersQuery),
    responses(
        (status = 200, description = "One page of transfers", body = TransferListResponse),
        (status = 400, description = "Invalid query", body = crate::transfers::ErrorBody)
    ),
    security(("api_key" = [])),
    tag = "Transfers"
)]
pub async fn list_transfers(
    State(state): State<AppState>,
    Query(params): Query<ListTransfersQuery>,
) -> Result<Json<TransferListResponse>, TransferError> {
    params
        .validate()
        .map_err(|e| TransferError::Validation(e.to_string()))?;
    let query = params.into_query()?;
    let page = state.service.find_all(&query).await?;

    Ok(Json(TransferListResponse {
        items: page.items,
        next_cursor: page.next_cursor.map(|id| id.to_string()),
    }))
}

/// Fetch a single transfer by ID
#[utoipa::path(
    get,
    path = "/transfers/{id}",
    params(("id" = String, Path, description = "Transfer ID")),
    responses(
        (status = 200, description = "The transfer", body = Transfer),
        (status = 404, description = "Unknown transfer", body = crate::transfers::ErrorBody)
    ),
    security(("api_key" = [])),
    tag = "Transfers"
)]
pub async fn get_transfer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Transfer>, TransferError> {
    let transfer = state.service.find_one(parse_id(&id)?).await?;
    Ok(Json(transfer))
}

/// Run a PENDING transfer to a terminal state via the provider
#[utoipa::path(
    post,
    path = "/transfers/{id}/process",
    params(("id" = String, Path, description = "Transfer ID")),
    responses(
        (status = 200, description = "Settled transfer (SUCCESS or FAILED)", body = Transfer),
        (status = 404, description = "Unknown transfer", body = crate::transfers::ErrorBody),
        (status = 409, description = "Transfer is not PENDING", body = crate::transfers::ErrorBody)
    ),
    security(("api_key" = [])),
    tag = "Transfers"
)]
pub async fn process_transfer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Transfer>, TransferError> {
    let transfer = state.service.process(parse_id(&id)?).await?;
    Ok(Json(transfer))
}

/// Cancel a PENDING transfer
#[utoipa::path(
    post,
    path = "/transfers/{id}/cancel",
    params(("id" = String, Path, description = "Transfer ID")),
    responses(
        (status = 200, description = "Canceled transfer", body = Transfer),
        (status = 404, description = "Unknown transfer", body = crate::transfers::ErrorBody),
        (status = 409, description = "Transfer is not PENDING", body = crate::transfers::ErrorBody)
    ),
    security(("api_key" = [])),
    tag = "Transfers"
)]
pub async fn cancel_transfer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Transfer>, TransferError> {
    let transfer = state.service.cancel(parse_id(&id)?).await?;
    Ok(Json(transfer))
}

/// Audit trail for one transfer, newest first
#[utoipa::path(
    get,
    path = "/transfers/{id}/audit",
    params(("id" = String, Path, description = "Transfer ID")),
    responses(
        (status = 200, description = "Audit entries", body = [AuditEntry]),
        (status = 404, description = "Unknown transfer", body = crate::transfers::ErrorBody)
    ),
    security(("api_key" = [])),
    tag = "Transfers"
)]
pub async fn get_transfer_audit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<AuditEntry>>, TransferError> {
    let entries = state.service.audit_trail(parse_id(&id)?).await?;
    Ok(Json(entries))
}
