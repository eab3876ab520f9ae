// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Upload fingerprinting — SHA-256 over the original bytes.

use klarwerk_core::error::{KlarwerkError, Result};
use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of `data`.
///
/// Recorded for every uploaded original so a later read can tell whether the
/// stored copy is still the one that was enhanced.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// `Ok(())` when `data` hashes to `expected_hex`, otherwise
/// `KlarwerkError::IntegrityMismatch`.
pub fn verify_hash(data: &[u8], expected_hex: &str) -> Result<()> {
    let actual = hash_bytes(data);
    if actual.eq_ignore_ascii_case(expected_hex) {
        Ok(())
    } else {
        Err(KlarwerkError::IntegrityMismatch {
            expected: expected_hex.to_owned(),
            actual,
        })
    }
}
