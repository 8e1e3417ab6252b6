//! Fee calculation.
//!
//! Rates use 10^6 precision: 8_000 = 0.8%.

/// Fee rate precision (10^6 = 1,000,000)
pub const FEE_PRECISION: u64 = 1_000_000;

/// Transfer fee rate (8000 = 0.8%)
pub const TRANSFER_FEE_RATE: u64 = 8_000;

/// Floor applied after the percentage
pub const MIN_FEE: u64 = 100;

/// Cap applied after the percentage
pub const MAX_FEE: u64 = 1_500;

/// Calculate the fee for a transfer amount.
///
/// `clamp(ceil(amount * 0.8%), 100, 1500)`. Rounding is always upward,
/// never nearest. Uses u128 intermediate to prevent overflow.
///
/// # Example
/// ```
/// use transfers_api::transfers::fees::transfer_fee;
/// assert_eq!(transfer_fee(15_000), 120);
/// assert_eq!(transfer_fee(200_000), 1_500); // capped
/// ```
#[inline]
pub fn transfer_fee(amount: u64) -> u64 {
    let precision = FEE_PRECISION as u128;
    let raw = (amount as u128 * TRANSFER_FEE_RATE as u128 + precision - 1) / precision;
    (raw as u64).clamp(MIN_FEE, MAX_FEE)
}
