//! # Group Parameters
//!
//! Arithmetic in the order-`q` subgroup of `Z_p*` for a safe prime `p = 2q + 1`.
//!
//! The built-in parameters are 256-bit and simulation grade. They are NOT
//! suitable for protecting real data.

use crate::errors::{CryptoError, CryptoResult};
use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::Rng;

/// 256-bit safe prime `p = 2q + 1`.
const SIMULATION_P: &str = "b64d5f996a85893eebbb8759ac3bf71c51ab39c2878b9606df0f71fda62f113b";

/// Prime order of the quadratic-residue subgroup.
const SIMULATION_Q: &str = "5b26afccb542c49f75ddc3acd61dfb8e28d59ce143c5cb036f87b8fed317889d";

/// Generator of the order-`q` subgroup (`4 = 2^2` is a quadratic residue).
const SIMULATION_G: u32 = 4;

/// Public group description `(p, q, g)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupParams {
    /// Safe prime modulus.
    pub p: BigUint,
    /// Subgroup order.
    pub q: BigUint,
    /// Subgroup generator.
    pub g: BigUint,
}

impl GroupParams {
    /// The fixed simulation-grade parameters.
    pub fn simulation() -> Self {
        // Constants are valid hex; parsing cannot fail.
        let parse = |hex: &str| BigUint::parse_bytes(hex.as_bytes(), 16).unwrap_or_default();
        Self {
            p: parse(SIMULATION_P),
            q: parse(SIMULATION_Q),
            g: BigUint::from(SIMULATION_G),
        }
    }

    /// Reduce an arbitrary integer into `Z_q`.
    pub fn reduce(&self, value: &BigUint) -> BigUint {
        value % &self.q
    }

    /// Whether `value ∈ [0, q)`.
    pub fn is_scalar(&self, value: &BigUint) -> bool {
        value < &self.q
    }

    /// Whether `value ∈ [1, q)`.
    pub fn is_nonzero_scalar(&self, value: &BigUint) -> bool {
        !value.is_zero() && self.is_scalar(value)
    }

    /// `g^exponent mod p`.
    pub fn pow_g(&self, exponent: &BigUint) -> BigUint {
        self.g.modpow(exponent, &self.p)
    }

    /// Uniform scalar in `[0, q)`.
    pub fn random_scalar<R: Rng + ?Sized>(&self, rng: &mut R) -> BigUint {
        rng.gen_biguint_below(&self.q)
    }

    /// Uniform scalar in `[1, q)`.
    pub fn random_nonzero_scalar<R: Rng + ?Sized>(&self, rng: &mut R) -> BigUint {
        rng.gen_biguint_range(&BigUint::one(), &self.q)
    }

    /// `a - b mod q` for scalars already reduced.
    pub fn sub_scalar(&self, a: &BigUint, b: &BigUint) -> BigUint {
        ((a % &self.q) + &self.q - (b % &self.q)) % &self.q
    }

    /// Multiplicative inverse in `Z_q` via Fermat (`x^(q-2)`).
    ///
    /// # Errors
    ///
    /// Returns `DomainError` for `x ≡ 0 (mod q)`.
    pub fn invert_scalar(&self, x: &BigUint) -> CryptoResult<BigUint> {
        let x = self.reduce(x);
        if x.is_zero() {
            return Err(CryptoError::DomainError("zero has no inverse mod q"));
        }
        let exponent = &self.q - BigUint::from(2u32);
        Ok(x.modpow(&exponent, &self.q))
    }
}

impl Default for GroupParams {
    fn default() -> Self {
        Self::simulation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_safe_prime_relation() {
        let params = GroupParams::simulation();
        assert_eq!(params.p, &params.q * 2u32 + 1u32);
        assert_eq!(params.p.bits(), 256);
    }

    #[test]
    fn test_generator_has_order_q() {
        let params = GroupParams::simulation();
        assert!(params.pow_g(&params.q).is_one());
        assert!(!params.g.is_one());
    }

    #[test]
    fn test_inverse() {
        let params = GroupParams::simulation();
        let mut rng = StdRng::seed_from_u64(1);
        let x = params.random_nonzero_scalar(&mut rng);
        let inv = params.invert_scalar(&x).unwrap();
        assert!(((x * inv) % &params.q).is_one());
    }

    #[test]
    fn test_zero_not_invertible() {
        let params = GroupParams::simulation();
        assert!(params.invert_scalar(&BigUint::zero()).is_err());
        assert!(params.invert_scalar(&params.q).is_err());
    }

    #[test]
    fn test_sub_wraps() {
        let params = GroupParams::simulation();
        let one = BigUint::one();
        let two = BigUint::from(2u32);
        assert_eq!(params.sub_scalar(&one, &two), &params.q - 1u32);
    }
}
