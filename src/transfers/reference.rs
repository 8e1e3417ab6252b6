//! Human-readable transfer references: `TRF-YYYYMMDD-XXXX`.
//!
//! Uniqueness is probabilistic here; the store's unique constraint on
//! `reference` is the real guarantee.

use chrono::Utc;
use rand::Rng;

const PREFIX: &str = "TRF";
const SUFFIX_LEN: usize = 4;
const SUFFIX_CHARSET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generate a reference with a random 4-character uppercase alphanumeric
/// suffix. Date is the generation date (UTC).
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_CHARSET[rng.gen_range(0..SUFFIX_CHARSET.len())] as char)
        .collect();

    format!("{}-{}-{}", PREFIX, Utc::now().format("%Y%m%d"), suffix)
}

/// Generate a reference with a zero-padded sequential suffix.
///
/// Bulk-seeding path: deterministic suffixes keep seeded data readable.
pub fn seeded(index: usize) -> String {
    format!(
        "{}-{}-{:0>width$}",
        PREFIX,
        Utc::now().format("%Y%m%d"),
        index,
        width = SUFFIX_LEN
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_format(reference: &str) {
        let parts: Vec<&str> = reference.split('-').collect();
        assert_eq!(parts.len(), 3, "bad reference: {}", reference);
        assert_eq!(parts[0], "TRF");
        assert_eq!(parts[1].len(), 8);
        assert!(parts[1].bytes().all(|b| b.is_ascii_digit()));
        assert_eq!(parts[2].len(), 4);
    }

    #[test]
    fn test_generate_format() {
        let reference = generate();
        assert_format(&reference);

        let suffix = reference.rsplit('-').next().unwrap();
        assert!(
            suffix
                .bytes()
                .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase()),
            "suffix not uppercase alphanumeric: {}",
            suffix
        );
    }

    #[test]
    fn test_generate_varies() {
        // 36^4 combinations; 20 draws colliding into one value would mean
        // the RNG is broken
        let refs: std::collections::HashSet<String> = (0..20).map(|_| generate()).collect();
        assert!(refs.len() > 1);
    }

    #[test]
    fn test_seeded_is_zero_padded() {
        let reference = seeded(7);
        assert_format(&reference);
        assert!(reference.ends_with("-0007"));

        assert!(seeded(0).ends_with("-0000"));
        assert!(seeded(1234).ends_with("-1234"));
    }
}
