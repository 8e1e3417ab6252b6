//! OpenAPI / Swagger UI documentation.
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::audit::AuditEntry;
use crate::gateway::handlers::{
    CreateTransferBody, HealthResponse, RecipientBody, TransferListResponse,
};
use crate::transfers::{ErrorBody, Transfer, TransferChannel, TransferStatus};

/// `x-api-key` header security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "x-api-key",
                    "Shared API key. Missing header: 401. Wrong key: 403.",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Transfers API",
        version = "1.0.0",
        description = "Mobile money transfer lifecycle: create, process, cancel, list, audit."
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health_check,
        crate::gateway::handlers::create_transfer,
        crate::gateway::handlers::list_transfers,
        crate::gateway::handlers::get_transfer,
        crate::gateway::handlers::process_transfer,
        crate::gateway::handlers::cancel_transfer,
        crate::gateway::handlers::get_transfer_audit,
    ),
    components(
        schemas(
            Transfer,
            TransferStatus,
            TransferChannel,
            CreateTransferBody,
            RecipientBody,
            TransferListResponse,
            AuditEntry,
            ErrorBody,
            HealthResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Transfers", description = "Transfer lifecycle operations (auth required)"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;
