//! # Chameleon Hash
//!
//! Discrete-log chameleon hash `CH(m, r) = g^m · pk^r mod p`.
//!
//! Anyone holding the public key can hash and verify. Only the holder of the
//! secret key `sk` (with `pk = g^sk`) can find a second randomness `r'` for a
//! new message `m'` such that `CH(m', r') = CH(m, r)`:
//!
//! ```text
//! r' = (m − m') · sk⁻¹ + r  (mod q)
//! ```

use crate::errors::{CryptoError, CryptoResult};
use crate::group::GroupParams;
use num_bigint::BigUint;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

/// Trapdoor secret. Bytes are big-endian and wiped on drop.
#[derive(Clone)]
pub struct SecretKey(Zeroizing<Vec<u8>>);

impl SecretKey {
    /// Wrap a scalar.
    pub fn from_scalar(value: &BigUint) -> Self {
        Self(Zeroizing::new(value.to_bytes_be()))
    }

    /// Create from big-endian bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(Zeroizing::new(bytes.to_vec()))
    }

    /// The scalar value.
    pub fn to_scalar(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// A chameleon hash together with the randomness that produced it.
///
/// Used as a block identifier: `hash` stays fixed across redactions while
/// `randomness` is replaced by a forged value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChameleonHashValue {
    /// `g^m · pk^r mod p`.
    pub hash: BigUint,
    /// `r ∈ [0, q)`.
    pub randomness: BigUint,
}

impl ChameleonHashValue {
    /// Full hex encoding of the hash component.
    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash.to_bytes_be())
    }
}

impl fmt::Display for ChameleonHashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.hash_hex();
        write!(f, "{}", &hex[..hex.len().min(16)])
    }
}

/// Public hashing context: group parameters plus public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChameleonHash {
    params: GroupParams,
    public_key: BigUint,
}

impl ChameleonHash {
    /// Create a hashing context for an existing public key.
    pub fn new(params: GroupParams, public_key: BigUint) -> Self {
        Self { params, public_key }
    }

    /// Group parameters.
    pub fn params(&self) -> &GroupParams {
        &self.params
    }

    /// Public key `pk = g^sk mod p`.
    pub fn public_key(&self) -> &BigUint {
        &self.public_key
    }

    /// Compute `CH(message, randomness)`. The message is reduced mod `q`.
    ///
    /// # Errors
    ///
    /// `DomainError` if `randomness ∉ [0, q)`.
    pub fn hash(&self, message: &BigUint, randomness: &BigUint) -> CryptoResult<ChameleonHashValue> {
        if !self.params.is_scalar(randomness) {
            return Err(CryptoError::DomainError("randomness outside [0, q)"));
        }
        let m = self.params.reduce(message);
        let left = self.params.pow_g(&m);
        let right = self.public_key.modpow(randomness, &self.params.p);
        Ok(ChameleonHashValue {
            hash: (left * right) % &self.params.p,
            randomness: randomness.clone(),
        })
    }

    /// Hash with fresh randomness drawn from `rng`.
    pub fn hash_random<R: Rng + ?Sized>(&self, message: &BigUint, rng: &mut R) -> ChameleonHashValue {
        let randomness = self.params.random_scalar(rng);
        let m = self.params.reduce(message);
        let hash = (self.params.pow_g(&m) * self.public_key.modpow(&randomness, &self.params.p)) % &self.params.p;
        ChameleonHashValue { hash, randomness }
    }

    /// Recompute and compare. Never mutates; out-of-range randomness yields `false`.
    pub fn verify(&self, message: &BigUint, randomness: &BigUint, expected_hash: &BigUint) -> bool {
        match self.hash(message, randomness) {
            Ok(value) => &value.hash == expected_hash,
            Err(_) => false,
        }
    }

    /// Find `r_new` such that `CH(m_new, r_new) = CH(m_old, r_old)`.
    ///
    /// # Errors
    ///
    /// `DomainError` if `sk ∉ [1, q)` or `r_old ∉ [0, q)`.
    pub fn forge(
        &self,
        secret_key: &SecretKey,
        m_old: &BigUint,
        r_old: &BigUint,
        m_new: &BigUint,
    ) -> CryptoResult<BigUint> {
        let sk = secret_key.to_scalar();
        if !self.params.is_nonzero_scalar(&sk) {
            return Err(CryptoError::DomainError("secret key outside [1, q)"));
        }
        if !self.params.is_scalar(r_old) {
            return Err(CryptoError::DomainError("randomness outside [0, q)"));
        }
        let sk_inv = self.params.invert_scalar(&sk)?;
        let delta = self.params.sub_scalar(m_old, m_new);
        Ok((delta * sk_inv + r_old) % &self.params.q)
    }

    /// Whether `secret_key` is the trapdoor for this public key.
    pub fn matches_secret(&self, secret_key: &SecretKey) -> bool {
        self.params.pow_g(&secret_key.to_scalar()) == self.public_key
    }
}

/// Trapdoor key pair.
#[derive(Debug, Clone)]
pub struct ChameleonKeyPair {
    hasher: ChameleonHash,
    secret_key: SecretKey,
}

impl ChameleonKeyPair {
    /// Generate `sk ∈ [1, q)` and `pk = g^sk mod p`.
    pub fn generate<R: Rng + ?Sized>(params: GroupParams, rng: &mut R) -> Self {
        let sk = params.random_nonzero_scalar(rng);
        let public_key = params.pow_g(&sk);
        Self {
            hasher: ChameleonHash::new(params, public_key),
            secret_key: SecretKey::from_scalar(&sk),
        }
    }

    /// Public hashing context.
    pub fn hasher(&self) -> &ChameleonHash {
        &self.hasher
    }

    /// Trapdoor secret.
    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    /// Split into the public context and the secret.
    pub fn into_parts(self) -> (ChameleonHash, SecretKey) {
        (self.hasher, self.secret_key)
    }
}
