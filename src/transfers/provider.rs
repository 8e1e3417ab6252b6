//! External payment provider seam.
//!
//! Production would talk to a real payout API; here a simulator stands in,
//! with tunable latency and a fixed success rate.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use super::types::TransferId;

/// Error codes the provider can return on a failed payout
pub const PROVIDER_ERROR_CODES: &[&str] = &[
    "INSUFFICIENT_FUNDS",
    "INVALID_RECIPIENT",
    "NETWORK_ERROR",
    "TIMEOUT",
    "PROVIDER_UNAVAILABLE",
];

/// Terminal outcome of one provider attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderOutcome {
    Success { provider_ref: String },
    Failure { error_code: String },
}

/// Payment provider contract. One call, one terminal outcome; the
/// implementation must not return until the attempt has settled.
#[async_trait]
pub trait ProviderGateway: Send + Sync {
    async fn process_transfer(&self, id: TransferId, amount: u64) -> ProviderOutcome;
}

/// Simulated provider: 2-3s latency, 70% success rate.
pub struct SimulatedProvider {
    base_delay: Duration,
    jitter: Duration,
    success_rate: f64,
}

impl SimulatedProvider {
    pub fn new() -> Self {
        Self {
            base_delay: Duration::from_millis(2_000),
            jitter: Duration::from_millis(1_000),
            success_rate: 0.7,
        }
    }

    /// Simulator with custom timing, for fast dev runs
    pub fn with_timing(base_delay: Duration, jitter: Duration) -> Self {
        Self {
            base_delay,
            jitter,
            success_rate: 0.7,
        }
    }
}

impl Default for SimulatedProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// `PROV-<epoch millis>-<6 uppercase alphanumerics>`
fn generate_provider_ref() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();
    format!("PROV-{}-{}", chrono::Utc::now().timestamp_millis(), suffix)
}

fn random_error_code() -> String {
    let idx = rand::thread_rng().gen_range(0..PROVIDER_ERROR_CODES.len());
    PROVIDER_ERROR_CODES[idx].to_string()
}

#[async_trait]
impl ProviderGateway for SimulatedProvider {
    async fn process_transfer(&self, id: TransferId, amount: u64) -> ProviderOutcome {
        let (delay, succeeded) = {
            let mut rng = rand::thread_rng();
            let jitter_ms = rng.gen_range(0..=self.jitter.as_millis() as u64);
            (
                self.base_delay + Duration::from_millis(jitter_ms),
                rng.gen_bool(self.success_rate),
            )
        };

        tracing::debug!(
            transfer_id = %id,
            amount,
            delay_ms = delay.as_millis() as u64,
            "Submitting transfer to provider"
        );
        tokio::time::sleep(delay).await;

        if succeeded {
            let provider_ref = generate_provider_ref();
            tracing::info!(transfer_id = %id, provider_ref = %provider_ref, "Provider accepted transfer");
            ProviderOutcome::Success { provider_ref }
        } else {
            let error_code = random_error_code();
            tracing::warn!(transfer_id = %id, error_code = %error_code, "Provider rejected transfer");
            ProviderOutcome::Failure { error_code }
        }
    }
}
