//! Consistency proofs for redactions

use serde::Serialize;
use shared_crypto::{BigUint, Hash};
use shared_types::RedactionKind;

/// Evidence that a redaction rewrote a block's contents without changing
/// its identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConsistencyProof {
    /// Commitment to the block contents before the redaction.
    pub pre_state: Hash,
    /// Commitment to the block contents after the redaction.
    pub post_state: Hash,
    pub pre_id: BigUint,
    pub post_id: BigUint,
    pub operation: RedactionKind,
    /// Commitment binding every field above.
    pub binding: Hash,
}
