//! Shared application state for the HTTP gateway.

use std::sync::Arc;

use crate::transfers::TransferService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TransferService>,
    /// Key checked by the `x-api-key` middleware
    pub api_key: String,
}

impl AppState {
    pub fn new(service: Arc<TransferService>, api_key: String) -> Self {
        Self { service, api_key }
    }
}
