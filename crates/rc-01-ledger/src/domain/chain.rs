//! Chain state management
//!
//! One `Chain` per node: the main branch from genesis to tip, stored in
//! height order with an id index for constant-time lookup.

use super::block::Block;
use super::error::{LedgerError, LedgerResult};
use shared_crypto::{BigUint, ChameleonHash};
use std::collections::HashMap;
use tracing::debug;

/// A node's main chain.
#[derive(Clone, Debug)]
pub struct Chain {
    /// Blocks by height; `blocks[0]` is genesis.
    blocks: Vec<Block>,
    /// Block id hash to height.
    index: HashMap<BigUint, u64>,
}

impl Chain {
    /// Create a chain containing only `genesis`.
    pub fn new(genesis: Block) -> Self {
        let mut index = HashMap::new();
        index.insert(genesis.hash().clone(), genesis.height);
        Self {
            blocks: vec![genesis],
            index,
        }
    }

    /// Tip block.
    pub fn tip(&self) -> &Block {
        // Never empty: constructed with genesis and truncation keeps it.
        &self.blocks[self.blocks.len() - 1]
    }

    /// Genesis block.
    pub fn genesis(&self) -> &Block {
        &self.blocks[0]
    }

    /// Height of the tip.
    pub fn height(&self) -> u64 {
        self.tip().height
    }

    /// Number of blocks including genesis.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false; a chain holds at least genesis.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Append a block that extends the tip.
    ///
    /// # Errors
    ///
    /// - `LinkageMismatch` if `previous_id` is not the tip id
    /// - `InvalidHeight` if height is not tip height + 1
    pub fn append(&mut self, block: Block) -> LedgerResult<()> {
        let tip = self.tip();
        if &block.previous_id != tip.hash() {
            return Err(LedgerError::LinkageMismatch { height: block.height });
        }
        if block.height != tip.height + 1 {
            return Err(LedgerError::InvalidHeight {
                expected: tip.height + 1,
                actual: block.height,
            });
        }
        self.index.insert(block.hash().clone(), block.height);
        self.blocks.push(block);
        Ok(())
    }

    /// Check if a block id is on this chain
    pub fn contains(&self, id: &BigUint) -> bool {
        self.index.contains_key(id)
    }

    /// Get a block by id
    pub fn get(&self, id: &BigUint) -> Option<&Block> {
        self.index.get(id).and_then(|h| self.blocks.get(*h as usize))
    }

    /// Get a block by height
    pub fn get_by_height(&self, height: u64) -> Option<&Block> {
        self.blocks.get(height as usize)
    }

    /// Mutable access for in-place redaction.
    ///
    /// Callers must only mutate through `Block::apply_redaction` and
    /// `Block::record_redaction`, which keep the id stable.
    pub fn get_mut_by_height(&mut self, height: u64) -> Option<&mut Block> {
        self.blocks.get_mut(height as usize)
    }

    /// Remove every block above `height` and return them in height order.
    pub fn truncate(&mut self, height: u64) -> Vec<Block> {
        let keep = (height as usize + 1).min(self.blocks.len()).max(1);
        let removed = self.blocks.split_off(keep);
        for block in &removed {
            self.index.remove(block.hash());
        }
        if !removed.is_empty() {
            debug!(from = height + 1, count = removed.len(), "Truncated chain");
        }
        removed
    }

    /// Replace the stored copy of a redacted block.
    ///
    /// Accepted only if a block with the same id exists at the same height and
    /// the incoming copy supersedes it (see `Block::supersedes`). Returns
    /// whether the replacement happened.
    pub fn replace_redacted(&mut self, block: Block) -> bool {
        let Some(&height) = self.index.get(block.hash()) else {
            return false;
        };
        if height != block.height {
            return false;
        }
        match self.blocks.get_mut(height as usize) {
            Some(existing) if block.supersedes(existing) => {
                *existing = block;
                true
            }
            _ => false,
        }
    }

    /// Sum of declared difficulty over all blocks.
    pub fn total_difficulty(&self) -> u64 {
        self.blocks.iter().map(|b| b.difficulty).sum()
    }

    /// Sum of declared difficulty up to and including `height`.
    pub fn difficulty_up_to(&self, height: u64) -> u64 {
        self.blocks
            .iter()
            .take(height as usize + 1)
            .map(|b| b.difficulty)
            .sum()
    }

    /// Iterate from genesis to tip.
    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    /// Full walk: every identity verifies, every link and height is sequential.
    ///
    /// # Errors
    ///
    /// `ConsistencyViolation` on the first broken block.
    pub fn verify_integrity(&self, hasher: &ChameleonHash) -> LedgerResult<()> {
        for (position, block) in self.blocks.iter().enumerate() {
            if block.height != position as u64 {
                return Err(LedgerError::ConsistencyViolation {
                    height: block.height,
                    reason: format!("stored at position {position}"),
                });
            }
            if !block.verify_identity(hasher) {
                return Err(LedgerError::ConsistencyViolation {
                    height: block.height,
                    reason: "chameleon id does not match contents".into(),
                });
            }
            if position > 0 && &block.previous_id != self.blocks[position - 1].hash() {
                return Err(LedgerError::ConsistencyViolation {
                    height: block.height,
                    reason: "previous_id does not match parent".into(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BlockTemplate, RedactionRecord, Transaction};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use shared_crypto::{ChameleonKeyPair, GroupParams};
    use shared_types::{NodeId, RedactionKind, RequestId, TxId};

    fn setup() -> (ChameleonKeyPair, StdRng) {
        let mut rng = StdRng::seed_from_u64(17);
        let kp = ChameleonKeyPair::generate(GroupParams::simulation(), &mut rng);
        (kp, rng)
    }

    fn create_child(hasher: &ChameleonHash, parent: &Block, difficulty: u64, rng: &mut StdRng) -> Block {
        let tx = Transaction::transfer(TxId(parent.height + 1), NodeId(1), NodeId(2), 5, parent.timestamp + 1);
        Block::seal(
            hasher,
            BlockTemplate {
                previous_id: parent.hash().clone(),
                height: parent.height + 1,
                transactions: vec![tx],
                miner: NodeId(1),
                timestamp: parent.timestamp + 10,
                difficulty,
                receipts: Vec::new(),
            },
            rng,
        )
    }

    fn build_chain(kp: &ChameleonKeyPair, rng: &mut StdRng, length: u64) -> Chain {
        let mut chain = Chain::new(Block::genesis(kp.hasher()).unwrap());
        for _ in 0..length {
            let child = create_child(kp.hasher(), chain.tip(), 2, rng);
            chain.append(child).unwrap();
        }
        chain
    }

    #[test]
    fn test_chain_genesis() {
        let (kp, _) = setup();
        let genesis = Block::genesis(kp.hasher()).unwrap();
        let chain = Chain::new(genesis.clone());
        assert_eq!(chain.height(), 0);
        assert!(chain.contains(genesis.hash()));
    }

    #[test]
    fn test_append_and_lookup() {
        let (kp, mut rng) = setup();
        let chain = build_chain(&kp, &mut rng, 3);
        assert_eq!(chain.height(), 3);
        assert_eq!(chain.len(), 4);
        let b2 = chain.get_by_height(2).unwrap();
        assert_eq!(chain.get(b2.hash()).unwrap().height, 2);
        assert_eq!(chain.total_difficulty(), 6);
        assert_eq!(chain.difficulty_up_to(1), 2);
    }

    #[test]
    fn test_append_rejects_wrong_parent() {
        let (kp, mut rng) = setup();
        let mut chain = build_chain(&kp, &mut rng, 2);
        let stale = create_child(kp.hasher(), chain.get_by_height(0).unwrap(), 1, &mut rng);
        assert!(matches!(chain.append(stale), Err(LedgerError::LinkageMismatch { height: 1 })));
    }

    #[test]
    fn test_truncate_keeps_genesis() {
        let (kp, mut rng) = setup();
        let mut chain = build_chain(&kp, &mut rng, 4);
        let removed = chain.truncate(1);
        assert_eq!(removed.len(), 3);
        assert_eq!(chain.height(), 1);
        assert!(!chain.contains(removed[0].hash()));
        assert!(chain.verify_integrity(kp.hasher()).is_ok());
    }

    #[test]
    fn test_replace_redacted_requires_longer_history() {
        let (kp, mut rng) = setup();
        let mut chain = build_chain(&kp, &mut rng, 2);
        let mut copy = chain.get_by_height(1).unwrap().clone();
        assert!(!chain.replace_redacted(copy.clone()));

        copy.record_redaction(RedactionRecord {
            request_id: RequestId(1),
            kind: RedactionKind::Delete,
            tx_index: 0,
            tx_id: TxId(1),
            requester: NodeId(0),
            approvers: vec![NodeId(0)],
            timestamp: 50,
        });
        assert!(chain.replace_redacted(copy));
        assert_eq!(chain.get_by_height(1).unwrap().redaction_history.len(), 1);
    }

    fn record(request: u64, tx: u64) -> RedactionRecord {
        RedactionRecord {
            request_id: RequestId(request),
            kind: RedactionKind::Delete,
            tx_index: 0,
            tx_id: TxId(tx),
            requester: NodeId(0),
            approvers: vec![NodeId(0)],
            timestamp: 50,
        }
    }

    #[test]
    fn test_replace_redacted_ignores_divergent_history() {
        let (kp, mut rng) = setup();
        let mut chain = build_chain(&kp, &mut rng, 2);
        let base = chain.get_by_height(1).unwrap().clone();

        let mut ours = base.clone();
        ours.record_redaction(record(1, 10));
        assert!(chain.replace_redacted(ours.clone()));

        // Same length, different record: neither copy supersedes the other
        let mut theirs = base.clone();
        theirs.record_redaction(record(2, 11));
        assert!(!chain.replace_redacted(theirs.clone()));

        // Longer, but not built on top of the stored history
        theirs.record_redaction(record(3, 12));
        assert!(!theirs.supersedes(&ours));
        assert!(!chain.replace_redacted(theirs));

        let mut extended = ours.clone();
        extended.record_redaction(record(4, 13));
        assert!(chain.replace_redacted(extended));
        assert_eq!(chain.get_by_height(1).unwrap().redaction_history.len(), 2);
    }

    #[test]
    fn test_verify_integrity_detects_tampering() {
        let (kp, mut rng) = setup();
        let mut chain = build_chain(&kp, &mut rng, 3);
        assert!(chain.verify_integrity(kp.hasher()).is_ok());

        if let Some(block) = chain.get_mut_by_height(2) {
            block.transactions.clear();
        }
        let err = chain.verify_integrity(kp.hasher()).unwrap_err();
        assert!(matches!(err, LedgerError::ConsistencyViolation { height: 2, .. }));
    }
}
