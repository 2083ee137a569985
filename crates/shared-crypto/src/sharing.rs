//! # Shamir Secret Sharing over `Z_q`
//!
//! Splits a trapdoor key into `total` shares of which any `threshold`
//! reconstruct it by Lagrange interpolation at zero.

use crate::chameleon::SecretKey;
use crate::errors::{CryptoError, CryptoResult};
use crate::group::GroupParams;
use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand::Rng;
use std::collections::HashSet;

/// One evaluation `(index, f(index))` of the sharing polynomial.
#[derive(Debug, Clone)]
pub struct KeyShare {
    /// Evaluation point, starting at 1.
    pub index: u32,
    /// `f(index) mod q`.
    pub value: SecretKey,
}

/// Split `secret` into `total` shares with reconstruction threshold `threshold`.
///
/// # Errors
///
/// `InvalidThreshold` unless `1 <= threshold <= total`.
pub fn split_secret<R: Rng + ?Sized>(
    params: &GroupParams,
    secret: &SecretKey,
    threshold: usize,
    total: usize,
    rng: &mut R,
) -> CryptoResult<Vec<KeyShare>> {
    if threshold == 0 || threshold > total || total > u32::MAX as usize {
        return Err(CryptoError::InvalidThreshold { threshold, total });
    }

    let mut coefficients = Vec::with_capacity(threshold);
    coefficients.push(params.reduce(&secret.to_scalar()));
    for _ in 1..threshold {
        coefficients.push(params.random_scalar(rng));
    }

    let shares = (1..=total as u32)
        .map(|index| {
            let x = BigUint::from(index);
            // Horner evaluation from the highest coefficient down.
            let y = coefficients
                .iter()
                .rev()
                .fold(BigUint::zero(), |acc, c| (acc * &x + c) % &params.q);
            KeyShare {
                index,
                value: SecretKey::from_scalar(&y),
            }
        })
        .collect();

    Ok(shares)
}

/// Reconstruct the secret from shares.
///
/// Uses every share passed in; callers pass at least `threshold` of them.
///
/// # Errors
///
/// `ZeroShareIndex` or `DuplicateShareIndex` for malformed evaluation points,
/// `TrapdoorUnavailable` for an empty share set.
pub fn reconstruct_secret(params: &GroupParams, shares: &[KeyShare]) -> CryptoResult<SecretKey> {
    if shares.is_empty() {
        return Err(CryptoError::TrapdoorUnavailable("no shares supplied".into()));
    }
    let mut seen = HashSet::new();
    for share in shares {
        if share.index == 0 {
            return Err(CryptoError::ZeroShareIndex);
        }
        if !seen.insert(share.index) {
            return Err(CryptoError::DuplicateShareIndex(share.index));
        }
    }

    let q = &params.q;
    let mut secret = BigUint::zero();
    for (i, share_i) in shares.iter().enumerate() {
        let x_i = BigUint::from(share_i.index);
        let mut numerator = BigUint::one();
        let mut denominator = BigUint::one();
        for (j, share_j) in shares.iter().enumerate() {
            if i == j {
                continue;
            }
            let x_j = BigUint::from(share_j.index);
            numerator = (numerator * &x_j) % q;
            denominator = (denominator * params.sub_scalar(&x_j, &x_i)) % q;
        }
        let lagrange = (numerator * params.invert_scalar(&denominator)?) % q;
        secret = (secret + share_i.value.to_scalar() * lagrange) % q;
    }

    Ok(SecretKey::from_scalar(&secret))
}
