//! SHA-256 commitment proof system
//!
//! Stands in for a zero-knowledge backend. A proof commits to the block
//! contents on both sides of the redaction and is accepted only if the
//! commitment is intact and the block id did not change.

use crate::domain::ConsistencyProof;
use crate::ports::ProofSystem;
use rc_01_ledger::Block;
use shared_crypto::{BigUint, Hash, Sha256Hasher};
use shared_types::RedactionKind;

/// Commitment-based `ProofSystem`.
#[derive(Clone, Copy, Debug, Default)]
pub struct CommitmentProofSystem;

impl CommitmentProofSystem {
    pub fn new() -> Self {
        Self
    }

    /// Commitment to a block's position and transaction contents.
    pub fn state_commitment(block: &Block) -> Hash {
        let mut digest = Sha256Hasher::new();
        digest
            .update_prefixed(&block.previous_id.to_bytes_be())
            .update_u64(block.height)
            .update_u64(block.transactions.len() as u64);
        for tx in &block.transactions {
            tx.digest_into(&mut digest);
        }
        digest.finalize()
    }

    fn binding(pre_state: &Hash, post_state: &Hash, pre_id: &BigUint, post_id: &BigUint, operation: RedactionKind) -> Hash {
        let tag: u64 = match operation {
            RedactionKind::Delete => 1,
            RedactionKind::Modify => 2,
            RedactionKind::Anonymize => 3,
        };
        let mut digest = Sha256Hasher::new();
        digest
            .update(pre_state)
            .update(post_state)
            .update_prefixed(&pre_id.to_bytes_be())
            .update_prefixed(&post_id.to_bytes_be())
            .update_u64(tag);
        digest.finalize()
    }
}

impl ProofSystem for CommitmentProofSystem {
    fn generate_consistency_proof(&self, pre: &Block, post: &Block, operation: RedactionKind) -> ConsistencyProof {
        let pre_state = Self::state_commitment(pre);
        let post_state = Self::state_commitment(post);
        let binding = Self::binding(&pre_state, &post_state, pre.hash(), post.hash(), operation);
        ConsistencyProof {
            pre_state,
            post_state,
            pre_id: pre.hash().clone(),
            post_id: post.hash().clone(),
            operation,
            binding,
        }
    }

    fn verify(&self, proof: &ConsistencyProof) -> bool {
        let expected = Self::binding(
            &proof.pre_state,
            &proof.post_state,
            &proof.pre_id,
            &proof.post_id,
            proof.operation,
        );
        expected == proof.binding && proof.pre_id == proof.post_id
    }
}
