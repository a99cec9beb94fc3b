//! Canonical serialization for board fingerprints.
//!
//! Fingerprints let a session tell whether its board differs from what was
//! last loaded or saved.
//!
//! ## Determinism
//!
//! - Struct fields serialize in declaration order
//! - Vectors serialize in index order
//! - Hashed data must not contain `HashMap`; use `BTreeMap`

use serde::Serialize;
use xxhash_rust::xxh64::xxh64;

/// Serialize a value to canonical JSON bytes.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).expect("Canonical serialization failed")
}

/// xxh64 of the canonical bytes.
pub fn canonical_hash<T: Serialize>(value: &T) -> u64 {
    xxh64(&to_canonical_bytes(value), 0)
}

/// [`canonical_hash`] as 16 lowercase hex digits.
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> String {
    format!("{:016x}", canonical_hash(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RatingRow, Tier};

    #[test]
    fn test_same_rows_same_hash() {
        let rows = vec![RatingRow::new("r1", Tier::S, 0), RatingRow::new("r2", Tier::S, 1)];
        assert_eq!(canonical_hash(&rows), canonical_hash(&rows.clone()));
        assert_eq!(canonical_hash_hex(&rows).len(), 16);
    }

    #[test]
    fn test_order_changes_hash() {
        let a = vec![RatingRow::new("r1", Tier::S, 0), RatingRow::new("r2", Tier::S, 1)];
        let b = vec![RatingRow::new("r2", Tier::S, 0), RatingRow::new("r1", Tier::S, 1)];
        assert_ne!(canonical_hash(&a), canonical_hash(&b));
    }
}
