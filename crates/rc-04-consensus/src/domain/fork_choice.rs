//! Fork choice rule
//!
//! Compares a side branch against the main chain. Only a strictly heavier
//! branch displaces the main chain; ties keep the block seen first.

use rc_01_ledger::Chain;
use rc_02_node::Branch;
use shared_types::ForkChoiceRule;
use std::cmp::Ordering;

/// Branch weighing under a configured rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ForkChoice {
    rule: ForkChoiceRule,
}

impl ForkChoice {
    pub fn new(rule: ForkChoiceRule) -> Self {
        Self { rule }
    }

    pub fn rule(&self) -> ForkChoiceRule {
        self.rule
    }

    /// Weight of the current main chain.
    pub fn main_weight(&self, chain: &Chain) -> u64 {
        match self.rule {
            ForkChoiceRule::LongestChain => chain.height(),
            ForkChoiceRule::HeaviestChain => chain.total_difficulty(),
        }
    }

    /// Weight the chain would have if `branch` replaced everything above its
    /// fork point.
    pub fn branch_weight(&self, chain: &Chain, branch: &Branch) -> u64 {
        match self.rule {
            ForkChoiceRule::LongestChain => branch.tip_height(),
            ForkChoiceRule::HeaviestChain => chain.difficulty_up_to(branch.fork_height) + branch.difficulty(),
        }
    }

    /// `Greater` means the branch should be adopted.
    pub fn compare(&self, chain: &Chain, branch: &Branch) -> Ordering {
        self.branch_weight(chain, branch).cmp(&self.main_weight(chain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rc_01_ledger::{Block, BlockTemplate};
    use shared_crypto::{ChameleonHash, ChameleonKeyPair, GroupParams};
    use shared_types::NodeId;

    fn child(hasher: &ChameleonHash, parent: &Block, difficulty: u64, rng: &mut StdRng) -> Block {
        Block::seal(
            hasher,
            BlockTemplate {
                previous_id: parent.hash().clone(),
                height: parent.height + 1,
                transactions: Vec::new(),
                miner: NodeId(0),
                timestamp: parent.timestamp + 1,
                difficulty,
                receipts: Vec::new(),
            },
            rng,
        )
    }

    /// Main chain of two difficulty-1 blocks; side branch of one difficulty-5 block.
    fn scenario() -> (Chain, Branch) {
        let mut rng = StdRng::seed_from_u64(9);
        let (hasher, _) = ChameleonKeyPair::generate(GroupParams::simulation(), &mut rng).into_parts();
        let genesis = Block::genesis(&hasher).unwrap();
        let mut chain = Chain::new(genesis.clone());
        let a1 = child(&hasher, &genesis, 1, &mut rng);
        let a2 = child(&hasher, &a1, 1, &mut rng);
        chain.append(a1).unwrap();
        chain.append(a2).unwrap();
        let b1 = child(&hasher, &genesis, 5, &mut rng);
        let branch = Branch {
            fork_height: 0,
            blocks: vec![b1],
        };
        (chain, branch)
    }

    #[test]
    fn test_longest_chain_counts_blocks() {
        let (chain, branch) = scenario();
        let fc = ForkChoice::new(ForkChoiceRule::LongestChain);
        assert_eq!(fc.main_weight(&chain), 2);
        assert_eq!(fc.branch_weight(&chain, &branch), 1);
        assert_eq!(fc.compare(&chain, &branch), Ordering::Less);
    }

    #[test]
    fn test_heaviest_chain_sums_difficulty() {
        let (chain, branch) = scenario();
        let fc = ForkChoice::new(ForkChoiceRule::HeaviestChain);
        assert_eq!(fc.main_weight(&chain), 2);
        assert_eq!(fc.branch_weight(&chain, &branch), 5);
        assert_eq!(fc.compare(&chain, &branch), Ordering::Greater);
    }
}
