//! Canonical stable hash used everywhere a placement decision needs to be
//! reproducible across processes, platforms, and Rust versions.
//!
//! Language-builtin `hash()` implementations are explicitly unstable
//! across processes and versions, which makes them unusable both for
//! seeding a PRNG that has to reproduce the same placement on every
//! node and for mapping object ids to PGs that must not move on
//! restart. A SHA-256 digest truncated to its first 8 bytes
//! (big-endian) gives a 64-bit seed with neither problem, and driving
//! `rand::rngs::StdRng` explicitly keeps it out of any process-global
//! generator's state.

use sha2::{Digest, Sha256};

/// Stable 64-bit hash of an arbitrary string, used both for
/// object_id -> pg_index mapping and for seeding the placement PRNG from
/// a pgid. Never change this without accepting that every existing
/// object "moves" to a different PG.
pub fn stable_hash64(s: &str) -> u64 {
    let digest = Sha256::digest(s.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[0..8]);
    u64::from_be_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_across_calls() {
        assert_eq!(stable_hash64("hello"), stable_hash64("hello"));
    }

    #[test]
    fn distinguishes_distinct_inputs() {
        assert_ne!(stable_hash64("0.0"), stable_hash64("0.1"));
    }

    #[test]
    fn known_vector() {
        // SHA-256("hello") = 2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824
        // first 8 bytes big-endian: 2cf24dba5fb0a30e
        assert_eq!(stable_hash64("hello"), 0x2cf24dba5fb0a30e);
    }
}
