//! # SHA-256 Hashing
//!
//! Message digests fed into the chameleon hash, and commitments used by the
//! consistency-proof adapter.

use crate::group::GroupParams;
use num_bigint::BigUint;
use sha2::{Digest, Sha256};

/// SHA-256 output (256-bit).
pub type Hash = [u8; 32];

/// Stateful SHA-256 hasher for canonical field-by-field digests.
#[derive(Clone, Default)]
pub struct Sha256Hasher {
    inner: Sha256,
}

impl Sha256Hasher {
    /// Create new hasher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update with raw bytes.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(data);
        self
    }

    /// Update with a big-endian `u64`.
    pub fn update_u64(&mut self, value: u64) -> &mut Self {
        self.inner.update(value.to_be_bytes());
        self
    }

    /// Update with a length-prefixed byte string.
    pub fn update_prefixed(&mut self, data: &[u8]) -> &mut Self {
        self.update_u64(data.len() as u64);
        self.inner.update(data);
        self
    }

    /// Finalize and return hash.
    pub fn finalize(self) -> Hash {
        self.inner.finalize().into()
    }
}

/// Hash data with SHA-256 (one-shot).
pub fn sha256(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

/// Interpret a digest as a big-endian integer reduced into `Z_q`.
pub fn digest_to_scalar(digest: &Hash, params: &GroupParams) -> BigUint {
    params.reduce(&BigUint::from_bytes_be(digest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vector() {
        let hash = sha256(b"abc");
        assert_eq!(
            hex::encode(hash),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_streaming_matches_oneshot() {
        let mut hasher = Sha256Hasher::new();
        hasher.update(b"hello ").update(b"world");
        assert_eq!(hasher.finalize(), sha256(b"hello world"));
    }

    #[test]
    fn test_prefix_disambiguates() {
        let mut a = Sha256Hasher::new();
        a.update_prefixed(b"ab").update_prefixed(b"c");
        let mut b = Sha256Hasher::new();
        b.update_prefixed(b"a").update_prefixed(b"bc");
        assert_ne!(a.finalize(), b.finalize());
    }

    #[test]
    fn test_scalar_below_q() {
        let params = GroupParams::simulation();
        let scalar = digest_to_scalar(&[0xff; 32], &params);
        assert!(params.is_scalar(&scalar));
    }
}
