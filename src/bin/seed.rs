//! Seed the database with sample transfers and coherent audit trails.
//!
//! Usage:
//!   cargo run --bin seed -- --env dev
//!
//! Wipes both tables, then inserts 20 transfers spread across all
//! statuses and channels. Requires postgres_url in the config.

use std::sync::Arc;

use rand::Rng;
use serde_json::json;
use sqlx::postgres::PgPoolOptions;

use transfers_api::audit::{AuditAction, AuditEntry, AuditStore, PgAuditStore};
use transfers_api::config::AppConfig;
use transfers_api::transfers::db::{self, PgTransferStore};
use transfers_api::transfers::fees::transfer_fee;
use transfers_api::transfers::types::{NewTransfer, Recipient, Transfer};
use transfers_api::transfers::{reference, TransferChannel, TransferStatus, TransferStore};

const SEED_COUNT: usize = 20;

const STATUSES: &[TransferStatus] = &[
    TransferStatus::Pending,
    TransferStatus::Processing,
    TransferStatus::Success,
    TransferStatus::Failed,
    TransferStatus::Canceled,
];

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

fn sample_transfer(index: usize) -> anyhow::Result<Transfer> {
    let mut rng = rand::thread_rng();
    let amount = rng.gen_range(10..=100) * 1_000u64;
    let channel = if index % 2 == 0 {
        TransferChannel::Wave
    } else {
        TransferChannel::Om
    };

    let req = NewTransfer {
        amount,
        currency: "XOF".to_string(),
        channel,
        recipient: Recipient {
            phone: format!("+2217{:0>8}", rng.gen_range(0..100_000_000u64)),
            name: format!("Client {}", index + 1),
        },
        metadata: match json!({ "orderId": format!("ORD-{}", 1000 + index) }) {
            serde_json::Value::Object(map) => Some(map),
            _ => None,
        },
    };

    let mut transfer = Transfer::create(req, reference::seeded(index), transfer_fee(amount))?;
    let status = STATUSES[rng.gen_range(0..STATUSES.len())];
    transfer.status = status;
    match status {
        TransferStatus::Success => {
            transfer.provider_ref = Some(format!(
                "PROV-{}-SEED{:02}",
                chrono::Utc::now().timestamp_millis(),
                index
            ));
        }
        TransferStatus::Failed => {
            transfer.error_code = Some("NETWORK_ERROR".to_string());
        }
        _ => {}
    }
    Ok(transfer)
}

/// Audit actions matching how the transfer would have reached its status
fn trail_for(transfer: &Transfer) -> Vec<AuditEntry> {
    let id = transfer.id.to_string();
    let reference = &transfer.reference;
    let created = AuditEntry::new(
        AuditAction::TransferCreated,
        id.clone(),
        reference.clone(),
        Some(json!({
            "amount": transfer.amount,
            "fees": transfer.fees,
            "total": transfer.total,
        })),
    );

    let mut trail = vec![created];
    match transfer.status {
        TransferStatus::Pending => {}
        TransferStatus::Processing => {
            trail.push(AuditEntry::new(
                AuditAction::TransferProcessing,
                id,
                reference.clone(),
                None,
            ));
        }
        TransferStatus::Success => {
            trail.push(AuditEntry::new(
                AuditAction::TransferProcessing,
                id.clone(),
                reference.clone(),
                None,
            ));
            trail.push(AuditEntry::new(
                AuditAction::TransferSuccess,
                id,
                reference.clone(),
                Some(json!({ "provider_ref": transfer.provider_ref })),
            ));
        }
        TransferStatus::Failed => {
            trail.push(AuditEntry::new(
                AuditAction::TransferProcessing,
                id.clone(),
                reference.clone(),
                None,
            ));
            trail.push(AuditEntry::new(
                AuditAction::TransferFailed,
                id,
                reference.clone(),
                Some(json!({ "error_code": transfer.error_code })),
            ));
        }
        TransferStatus::Canceled => {
            trail.push(AuditEntry::new(
                AuditAction::TransferCanceled,
                id,
                reference.clone(),
                None,
            ));
        }
    }
    trail
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load(&get_env());

    let url = config
        .postgres_url
        .ok_or_else(|| anyhow::anyhow!("postgres_url is required for seeding"))?;

    let pool = PgPoolOptions::new().max_connections(5).connect(&url).await?;
    db::init_schema(&pool).await?;

    sqlx::query("TRUNCATE transfers_tb, audit_logs_tb")
        .execute(&pool)
        .await?;

    let store = Arc::new(PgTransferStore::new(pool.clone()));
    let audit = Arc::new(PgAuditStore::new(pool));

    let mut by_status = std::collections::BTreeMap::new();
    for index in 0..SEED_COUNT {
        let transfer = sample_transfer(index)?;
        store.insert(&transfer).await?;
        for entry in trail_for(&transfer) {
            audit.append(&entry).await?;
        }
        *by_status.entry(transfer.status.as_str()).or_insert(0u32) += 1;
        println!(
            "  {} {:>10} {:>8} {}",
            transfer.reference,
            transfer.status.as_str(),
            transfer.amount,
            transfer.recipient.name
        );
    }

    println!("\nSeeded {} transfers:", SEED_COUNT);
    for (status, count) in by_status {
        println!("  {:>10}: {}", status, count);
    }

    Ok(())
}
