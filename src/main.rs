//! Transfers API server entry point.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use transfers_api::audit::{AuditRecorder, AuditStore, MemoryAuditStore, PgAuditStore};
use transfers_api::config::AppConfig;
use transfers_api::gateway::state::AppState;
use transfers_api::gateway::run_server;
use transfers_api::logging::init_logging;
use transfers_api::transfers::{
    db::{self, PgTransferStore},
    MemoryTransferStore, SimulatedProvider, TransferService, TransferStore,
};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

#[tokio::main]
async fn main() {
    let env = get_env();
    let config = AppConfig::load(&env);
    let _guard = init_logging(&config);

    tracing::info!(env = %env, "Starting transfers API");

    let (store, audit_store): (Arc<dyn TransferStore>, Arc<dyn AuditStore>) =
        match &config.postgres_url {
            Some(url) => {
                let pool = match PgPoolOptions::new().max_connections(10).connect(url).await {
                    Ok(pool) => pool,
                    Err(e) => {
                        eprintln!("FATAL: Failed to connect to PostgreSQL: {}", e);
                        std::process::exit(1);
                    }
                };
                if let Err(e) = db::init_schema(&pool).await {
                    eprintln!("FATAL: Failed to initialize database schema: {}", e);
                    std::process::exit(1);
                }
                (
                    Arc::new(PgTransferStore::new(pool.clone())),
                    Arc::new(PgAuditStore::new(pool)),
                )
            }
            None => {
                tracing::warn!(
                    "No postgres_url configured, using in-memory stores (data is not persisted)"
                );
                (
                    Arc::new(MemoryTransferStore::new()),
                    Arc::new(MemoryAuditStore::new()),
                )
            }
        };

    let audit = Arc::new(AuditRecorder::new(audit_store));
    let provider = Arc::new(SimulatedProvider::new());
    let service = Arc::new(TransferService::new(store, audit, provider));

    let state = AppState::new(service, config.api_key.clone());
    run_server(state, &config.gateway.host, config.gateway.port).await;
}
