//! # Trapdoor Holders
//!
//! The capability to forge a chameleon collision. Two custody models:
//!
//! - `SingleAuthority`: one node holds the whole secret key.
//! - `ThresholdShares`: the key exists only as Shamir shares. It is
//!   reconstructed for a single forge call once `threshold` shares have been
//!   collected, then dropped (and zeroized).

use crate::chameleon::{ChameleonHash, SecretKey};
use crate::errors::{CryptoError, CryptoResult};
use crate::sharing::{reconstruct_secret, KeyShare};
use num_bigint::BigUint;

/// Who can forge, and with what material.
#[derive(Debug, Clone)]
pub enum TrapdoorHolder {
    /// Full secret key held by one party.
    SingleAuthority {
        /// The trapdoor.
        secret_key: SecretKey,
    },
    /// Shares collected so far.
    ThresholdShares {
        /// Collected shares.
        shares: Vec<KeyShare>,
        /// Shares needed to reconstruct.
        threshold: usize,
    },
}

impl TrapdoorHolder {
    /// Start an empty share collection.
    pub fn collecting(threshold: usize) -> Self {
        Self::ThresholdShares {
            shares: Vec::new(),
            threshold,
        }
    }

    /// Add a share. Shares with an index already present are ignored.
    /// No effect on a single authority.
    pub fn add_share(&mut self, share: KeyShare) {
        if let Self::ThresholdShares { shares, .. } = self {
            if shares.iter().all(|s| s.index != share.index) {
                shares.push(share);
            }
        }
    }

    /// Whether a forge attempt has enough material.
    pub fn is_available(&self) -> bool {
        match self {
            Self::SingleAuthority { .. } => true,
            Self::ThresholdShares { shares, threshold } => shares.len() >= *threshold,
        }
    }

    /// Forge `r_new` with the held trapdoor.
    ///
    /// # Errors
    ///
    /// - `TrapdoorUnavailable` with fewer than `threshold` shares, or when the
    ///   reconstructed key does not match the public key
    /// - `DomainError` from the underlying forge
    pub fn forge(
        &self,
        hasher: &ChameleonHash,
        m_old: &BigUint,
        r_old: &BigUint,
        m_new: &BigUint,
    ) -> CryptoResult<BigUint> {
        match self {
            Self::SingleAuthority { secret_key } => hasher.forge(secret_key, m_old, r_old, m_new),
            Self::ThresholdShares { shares, threshold } => {
                if shares.len() < *threshold {
                    return Err(CryptoError::TrapdoorUnavailable(format!(
                        "{} of {} shares collected",
                        shares.len(),
                        threshold
                    )));
                }
                let secret_key = reconstruct_secret(hasher.params(), &shares[..*threshold])?;
                if !hasher.matches_secret(&secret_key) {
                    return Err(CryptoError::TrapdoorUnavailable(
                        "reconstructed key does not match public key".into(),
                    ));
                }
                hasher.forge(&secret_key, m_old, r_old, m_new)
            }
        }
    }
}
