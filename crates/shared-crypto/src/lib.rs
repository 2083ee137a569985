//! # Shared Crypto - Chameleon Hash Trapdoor Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `group` | Safe-prime subgroup of `Z_p*` | Scalar arithmetic |
//! | `chameleon` | Discrete-log chameleon hash | Block identity, collision forging |
//! | `sharing` | Shamir over `Z_q` | Threshold trapdoor custody |
//! | `trapdoor` | `TrapdoorHolder` | Forge capability |
//! | `hashing` | SHA-256 | Message digests, commitments |
//!
//! ## Security Properties
//!
//! - **Collision resistance** without the trapdoor (discrete log in the order-`q` subgroup)
//! - **Forgeability** with the trapdoor: `r' = (m − m')·sk⁻¹ + r mod q`
//! - **Zeroization**: `SecretKey` bytes are wiped on drop
//!
//! Parameters are 256-bit and simulation grade only.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chameleon;
pub mod errors;
pub mod group;
pub mod hashing;
pub mod sharing;
pub mod trapdoor;

// Re-exports
pub use chameleon::{ChameleonHash, ChameleonHashValue, ChameleonKeyPair, SecretKey};
pub use errors::{CryptoError, CryptoResult};
pub use group::GroupParams;
pub use hashing::{digest_to_scalar, sha256, Hash, Sha256Hasher};
pub use num_bigint::BigUint;
pub use sharing::{reconstruct_secret, split_secret, KeyShare};
pub use trapdoor::TrapdoorHolder;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
