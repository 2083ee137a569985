//! Driven ports (Outbound dependencies)

use crate::domain::ConsistencyProof;
use rc_01_ledger::Block;
use shared_types::RedactionKind;

/// Proof generation and verification for policies that require one.
///
/// Treated as opaque by the engine: a proof is generated for the pre- and
/// post-redaction block and must verify before the block is touched.
pub trait ProofSystem {
    /// Prove that `post` is a consistent `operation` applied to `pre`.
    fn generate_consistency_proof(&self, pre: &Block, post: &Block, operation: RedactionKind) -> ConsistencyProof;

    /// Check a proof.
    fn verify(&self, proof: &ConsistencyProof) -> bool;
}
