//! # Workload Generator
//!
//! Fills every mined block with a synthetic transaction batch. Kinds are
//! drawn per transaction from the configured mix; everything not claimed by
//! a ratio is a plain transfer. All randomness comes from the scheduler RNG,
//! so a run is reproducible from its seed.

use rand::seq::SliceRandom;
use rand::Rng;
use rc_01_ledger::{ContractAddress, ContractCall, ContractDeploy, RedactionIntent, Transaction};
use rc_02_node::Node;
use shared_types::{LogicalTime, NodeId, RedactionKind, TxId, WorkloadConfig};

const METHODS: [&str; 4] = ["setRetention", "recordAccess", "logRedaction", "updateConsent"];

/// Produces transaction batches for block assembly.
#[derive(Debug, Clone)]
pub struct WorkloadGenerator {
    config: WorkloadConfig,
    next_tx: u64,
}

impl WorkloadGenerator {
    pub fn new(config: WorkloadConfig) -> Self {
        Self { config, next_tx: 1 }
    }

    /// Transactions generated so far.
    pub fn generated(&self) -> u64 {
        self.next_tx - 1
    }

    /// Build the batch for a block mined by `miner`.
    ///
    /// Contract calls target `contracts`; redaction requests target a block
    /// on the miner's chain. Either falls back to a transfer when there is
    /// nothing to target.
    pub fn next_batch<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        miner: &Node,
        roster: &[Node],
        contracts: &[ContractAddress],
        now: LogicalTime,
    ) -> Vec<Transaction> {
        (0..self.config.txs_per_block)
            .map(|_| self.next_transaction(rng, miner, roster, contracts, now))
            .collect()
    }

    fn next_transaction<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        miner: &Node,
        roster: &[Node],
        contracts: &[ContractAddress],
        now: LogicalTime,
    ) -> Transaction {
        let id = TxId(self.next_tx);
        self.next_tx += 1;
        let sender = random_node(rng, roster);

        let draw: f64 = rng.gen();
        let call_bound = self.config.contract_call_ratio;
        let deploy_bound = call_bound + self.config.contract_deploy_ratio;
        let redaction_bound = deploy_bound + self.config.redaction_request_ratio;

        if draw < call_bound {
            if let Some(&contract) = contracts.choose(rng) {
                return Transaction::contract_call(id, sender, random_call(rng, contract), now);
            }
        } else if draw < deploy_bound {
            let deploy = ContractDeploy {
                code: format!("contract Generated{}", id.0),
                gas_limit: 100_000,
            };
            return Transaction::contract_deploy(id, sender, deploy, now);
        } else if draw < redaction_bound {
            if let Some(intent) = random_intent(rng, miner) {
                return Transaction::redaction_request(id, sender, intent, now);
            }
        }

        let recipient = random_node(rng, roster);
        Transaction::transfer(id, sender, recipient, rng.gen_range(1..=1_000), now)
    }
}

fn random_node<R: Rng + ?Sized>(rng: &mut R, roster: &[Node]) -> NodeId {
    roster.choose(rng).map_or(NodeId(0), Node::id)
}

fn random_call<R: Rng + ?Sized>(rng: &mut R, contract: ContractAddress) -> ContractCall {
    let method = METHODS.choose(rng).copied().unwrap_or("recordAccess");
    let args = (0..rng.gen_range(0..=3))
        .map(|_| format!("v{}", rng.gen::<u16>()))
        .collect();
    ContractCall {
        contract,
        method: method.to_string(),
        args,
        // Low limits fail with OutOfGas and stay in the block without a receipt.
        gas_limit: rng.gen_range(20_000..=60_000),
    }
}

fn random_intent<R: Rng + ?Sized>(rng: &mut R, miner: &Node) -> Option<RedactionIntent> {
    let tip = miner.chain().height();
    if tip == 0 {
        return None;
    }
    let target_height = rng.gen_range(1..=tip);
    let block = miner.chain().get_by_height(target_height)?;
    if block.transactions.is_empty() {
        return None;
    }
    let tx_index = rng.gen_range(0..block.transactions.len());
    let kind = *RedactionKind::ALL.choose(rng)?;
    let reason = match kind {
        RedactionKind::Delete => "GDPR erasure request",
        RedactionKind::Modify => "data correction",
        RedactionKind::Anonymize => "audit anonymization",
    };
    Some(RedactionIntent {
        target_height,
        tx_index,
        kind,
        reason: reason.to_string(),
        replacement: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rc_01_ledger::{Block, BlockTemplate, TxKind};
    use shared_crypto::{ChameleonKeyPair, GroupParams};
    use shared_types::{NodeSpec, Role};

    fn roster(rng: &mut StdRng, height: u64) -> Vec<Node> {
        let (hasher, _) = ChameleonKeyPair::generate(GroupParams::simulation(), rng).into_parts();
        let genesis = Block::genesis(&hasher).unwrap();
        let mut nodes: Vec<Node> = (0..3)
            .map(|i| Node::new(NodeId(i), &NodeSpec::new(Role::Miner, 1.0), genesis.clone()))
            .collect();
        for h in 1..=height {
            let block = Block::seal(
                &hasher,
                BlockTemplate {
                    previous_id: nodes[0].chain().tip().hash().clone(),
                    height: h,
                    transactions: vec![Transaction::transfer(TxId(1_000 + h), NodeId(0), NodeId(1), 1, 0)],
                    miner: NodeId(0),
                    timestamp: h,
                    difficulty: 1,
                    receipts: Vec::new(),
                },
                rng,
            );
            nodes[0].chain_mut().append(block).unwrap();
        }
        nodes
    }

    #[test]
    fn test_batch_size_and_unique_ids() {
        let mut rng = StdRng::seed_from_u64(8);
        let nodes = roster(&mut rng, 0);
        let mut generator = WorkloadGenerator::new(WorkloadConfig::default());
        let first = generator.next_batch(&mut rng, &nodes[0], &nodes, &[], 10);
        let second = generator.next_batch(&mut rng, &nodes[0], &nodes, &[], 20);
        assert_eq!(first.len(), 8);
        assert_eq!(generator.generated(), 16);
        let mut ids: Vec<TxId> = first.iter().chain(&second).map(|tx| tx.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 16);
    }

    #[test]
    fn test_fallbacks_without_targets() {
        let mut rng = StdRng::seed_from_u64(9);
        let nodes = roster(&mut rng, 0);
        let config = WorkloadConfig {
            txs_per_block: 20,
            contract_call_ratio: 0.5,
            contract_deploy_ratio: 0.0,
            redaction_request_ratio: 0.5,
        };
        let batch = WorkloadGenerator::new(config).next_batch(&mut rng, &nodes[0], &nodes, &[], 0);
        assert!(batch.iter().all(|tx| tx.kind == TxKind::Transfer));
    }

    #[test]
    fn test_redaction_intents_target_miner_chain() {
        let mut rng = StdRng::seed_from_u64(10);
        let nodes = roster(&mut rng, 4);
        let config = WorkloadConfig {
            txs_per_block: 30,
            contract_call_ratio: 0.0,
            contract_deploy_ratio: 0.0,
            redaction_request_ratio: 1.0,
        };
        let batch = WorkloadGenerator::new(config).next_batch(&mut rng, &nodes[0], &nodes, &[], 0);
        for tx in &batch {
            match &tx.payload {
                rc_01_ledger::TxPayload::RedactionIntent(intent) => {
                    assert!((1..=4).contains(&intent.target_height));
                    assert_eq!(intent.tx_index, 0);
                }
                other => panic!("unexpected payload {other:?}"),
            }
        }
    }

    #[test]
    fn test_mix_is_roughly_configured() {
        let mut rng = StdRng::seed_from_u64(11);
        let nodes = roster(&mut rng, 2);
        let contracts = [ContractAddress(1), ContractAddress(2)];
        let config = WorkloadConfig {
            txs_per_block: 4_000,
            ..WorkloadConfig::default()
        };
        let batch = WorkloadGenerator::new(config).next_batch(&mut rng, &nodes[0], &nodes, &contracts, 0);
        let transfers = batch.iter().filter(|tx| tx.kind == TxKind::Transfer).count();
        let ratio = transfers as f64 / batch.len() as f64;
        assert!((0.75..0.85).contains(&ratio), "transfer ratio {ratio}");
    }
}
