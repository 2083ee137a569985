//! Block domain entities
//!
//! A block's identity is a chameleon hash over `H(previous_id ‖ transactions)`.
//! Redaction swaps the transactions and the randomness together so that the
//! identity, and therefore every child's `previous_id` link, never changes.

use super::error::{LedgerError, LedgerResult};
use super::transaction::{ExecutionReceipt, Transaction};
use num_traits::Zero;
use rand::Rng;
use serde::{Deserialize, Serialize};
use shared_crypto::{digest_to_scalar, BigUint, ChameleonHash, ChameleonHashValue, Sha256Hasher};
use shared_types::{LogicalTime, NodeId, RedactionKind, RequestId, TxId};

/// Audit entry appended to a block each time it is redacted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionRecord {
    pub request_id: RequestId,
    pub kind: RedactionKind,
    pub tx_index: usize,
    pub tx_id: TxId,
    pub requester: NodeId,
    pub approvers: Vec<NodeId>,
    pub timestamp: LogicalTime,
}

/// A block on some node's chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: ChameleonHashValue,
    /// `id.hash` of the parent; zero for genesis.
    pub previous_id: BigUint,
    pub height: u64,
    pub transactions: Vec<Transaction>,
    pub miner: NodeId,
    pub timestamp: LogicalTime,
    /// Declared work, used by heaviest-chain fork choice.
    pub difficulty: u64,
    pub receipts: Vec<ExecutionReceipt>,
    pub redaction_history: Vec<RedactionRecord>,
}

/// Fields of a block before its identity is computed.
#[derive(Clone, Debug)]
pub struct BlockTemplate {
    pub previous_id: BigUint,
    pub height: u64,
    pub transactions: Vec<Transaction>,
    pub miner: NodeId,
    pub timestamp: LogicalTime,
    pub difficulty: u64,
    pub receipts: Vec<ExecutionReceipt>,
}

/// Message scalar `H(previous_id ‖ transactions) mod q`.
pub fn compute_message(hasher: &ChameleonHash, previous_id: &BigUint, transactions: &[Transaction]) -> BigUint {
    let mut digest = Sha256Hasher::new();
    digest
        .update_prefixed(&previous_id.to_bytes_be())
        .update_u64(transactions.len() as u64);
    for tx in transactions {
        tx.digest_into(&mut digest);
    }
    digest_to_scalar(&digest.finalize(), hasher.params())
}

impl Block {
    /// Shared genesis block: height 0, no parent, zero randomness.
    ///
    /// Every node derives the identical genesis from the same public key.
    pub fn genesis(hasher: &ChameleonHash) -> LedgerResult<Self> {
        let previous_id = BigUint::zero();
        let message = compute_message(hasher, &previous_id, &[]);
        let id = hasher.hash(&message, &BigUint::zero())?;
        Ok(Self {
            id,
            previous_id,
            height: 0,
            transactions: Vec::new(),
            miner: NodeId(0),
            timestamp: 0,
            difficulty: 0,
            receipts: Vec::new(),
            redaction_history: Vec::new(),
        })
    }

    /// Seal a template with fresh randomness.
    pub fn seal<R: Rng + ?Sized>(hasher: &ChameleonHash, template: BlockTemplate, rng: &mut R) -> Self {
        let message = compute_message(hasher, &template.previous_id, &template.transactions);
        let id = hasher.hash_random(&message, rng);
        Self {
            id,
            previous_id: template.previous_id,
            height: template.height,
            transactions: template.transactions,
            miner: template.miner,
            timestamp: template.timestamp,
            difficulty: template.difficulty,
            receipts: template.receipts,
            redaction_history: Vec::new(),
        }
    }

    /// The stable identifier used for linkage and lookup.
    pub fn hash(&self) -> &BigUint {
        &self.id.hash
    }

    /// Check if this is a genesis block
    pub fn is_genesis(&self) -> bool {
        self.height == 0 && self.previous_id.is_zero()
    }

    /// Current message scalar.
    pub fn message(&self, hasher: &ChameleonHash) -> BigUint {
        compute_message(hasher, &self.previous_id, &self.transactions)
    }

    /// Chain-validity invariant: `id.hash == CH(message, id.randomness)`.
    pub fn verify_identity(&self, hasher: &ChameleonHash) -> bool {
        hasher.verify(&self.message(hasher), &self.id.randomness, &self.id.hash)
    }

    /// Look up a transaction by index.
    pub fn transaction(&self, index: usize) -> LedgerResult<&Transaction> {
        self.transactions.get(index).ok_or(LedgerError::TxIndexOutOfRange {
            index,
            len: self.transactions.len(),
        })
    }

    /// Install redacted contents under the same identity.
    ///
    /// Receipts whose transaction is no longer present are dropped.
    ///
    /// # Errors
    ///
    /// `ConsistencyViolation` if `CH(new message, new_randomness) != id.hash`.
    /// The block is left untouched in that case.
    pub fn apply_redaction(
        &mut self,
        hasher: &ChameleonHash,
        new_transactions: Vec<Transaction>,
        new_randomness: BigUint,
    ) -> LedgerResult<()> {
        let message = compute_message(hasher, &self.previous_id, &new_transactions);
        if !hasher.verify(&message, &new_randomness, &self.id.hash) {
            return Err(LedgerError::ConsistencyViolation {
                height: self.height,
                reason: format!("redacted contents do not reproduce block id {}", self.id),
            });
        }
        self.receipts
            .retain(|receipt| new_transactions.iter().any(|tx| tx.id == receipt.tx_id));
        self.transactions = new_transactions;
        self.id.randomness = new_randomness;
        Ok(())
    }

    /// Append an audit record.
    pub fn record_redaction(&mut self, record: RedactionRecord) {
        self.redaction_history.push(record);
    }

    /// Whether this copy carries every redaction of `stored` plus at least
    /// one more, in the same order.
    ///
    /// Copies whose histories diverge supersede neither way.
    pub fn supersedes(&self, stored: &Block) -> bool {
        self.id.hash == stored.id.hash
            && self.redaction_history.len() > stored.redaction_history.len()
            && self.redaction_history.starts_with(&stored.redaction_history)
    }
}
