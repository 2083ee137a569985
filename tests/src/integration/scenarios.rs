//! # Reference Scenarios
//!
//! Exercises the subsystems together the way the runtime wires them:
//!
//! - **A**: lottery over three weighted miners follows a fixed sequence for
//!   seed 42, whatever the workload
//! - **B**: a USER vote never counts towards an ADMIN/REGULATOR quorum
//! - **C**: DELETE on block 5, tx 2 keeps the block id and every link
//! - **D**: a third node keeps its first block at equal height and reorgs
//!   when the competing branch grows

#[cfg(test)]
mod tests {
    use node_runtime::Simulation;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rc_01_ledger::{Block, RedactionIntent, Transaction};
    use rc_02_node::{Node, SyncState};
    use rc_04_consensus::{BlockStatus, ConsensusDependencies, ConsensusService, GasMeteredExecutor};
    use rc_05_redaction::{
        CommitmentProofSystem, PolicyBook, RedactionDependencies, RedactionEngine, RedactionError,
        RedactionStatus, TrapdoorCustody,
    };
    use shared_crypto::{ChameleonHash, ChameleonKeyPair, GroupParams, TrapdoorHolder};
    use shared_types::{
        ConsensusSettings, NodeId, NodeSpec, RedactionKind, RedactionPolicy, Role, SimulationConfig, TxId,
    };

    // =========================================================================
    // FIXTURES
    // =========================================================================

    struct Network {
        consensus: ConsensusService<GasMeteredExecutor>,
        engine: RedactionEngine,
        hasher: ChameleonHash,
        nodes: Vec<Node>,
        rng: StdRng,
        next_tx: u64,
    }

    fn network(roles: &[Role], policies: Vec<RedactionPolicy>) -> Network {
        let mut rng = StdRng::seed_from_u64(2024);
        let (hasher, secret_key) = ChameleonKeyPair::generate(GroupParams::simulation(), &mut rng).into_parts();
        let genesis = Block::genesis(&hasher).unwrap();
        let nodes = roles
            .iter()
            .enumerate()
            .map(|(i, role)| Node::new(NodeId(i as u32), &NodeSpec::new(*role, 1.0), genesis.clone()))
            .collect();
        let consensus = ConsensusService::new(ConsensusDependencies {
            executor: GasMeteredExecutor::with_builtin_contracts(),
            hasher: hasher.clone(),
            settings: ConsensusSettings::default(),
        });
        let engine = RedactionEngine::new(RedactionDependencies {
            policies: PolicyBook::new(policies, 2),
            approval_window: 3_600_000,
            hasher: hasher.clone(),
            custody: TrapdoorCustody::Central {
                authority: NodeId(0),
                holder: TrapdoorHolder::SingleAuthority { secret_key },
            },
            proof_system: Some(Box::new(CommitmentProofSystem::new())),
        });
        Network {
            consensus,
            engine,
            hasher,
            nodes,
            rng,
            next_tx: 1,
        }
    }

    fn gdpr_policy() -> RedactionPolicy {
        RedactionPolicy::new(
            "GDPR_COMPLIANCE",
            RedactionKind::Delete,
            [Role::Admin, Role::Regulator],
            2,
            0,
        )
    }

    impl Network {
        /// Node `i` mines a block of `txs` transfers at `now`.
        fn mine(&mut self, i: usize, txs: usize, now: u64) -> Block {
            let transactions = (0..txs)
                .map(|_| {
                    let id = TxId(self.next_tx);
                    self.next_tx += 1;
                    Transaction::transfer(id, NodeId(i as u32), NodeId(0), 1, now)
                })
                .collect();
            self.consensus
                .assemble_block(&mut self.nodes[i], transactions, now, &mut self.rng)
                .unwrap()
        }

        fn deliver(&mut self, i: usize, block: &Block, now: u64) -> BlockStatus {
            self.consensus
                .on_receive_block(&mut self.nodes[i], block.clone(), now)
                .unwrap()
                .status
        }

        /// Node 0 mines `height` blocks; every other node receives them.
        fn shared_prefix(&mut self, height: u64, txs: usize) {
            for h in 1..=height {
                let block = self.mine(0, txs, h * 100);
                for i in 1..self.nodes.len() {
                    assert_eq!(self.deliver(i, &block, h * 100 + 1), BlockStatus::Extended);
                }
            }
        }
    }

    fn delete_intent(target_height: u64, tx_index: usize) -> RedactionIntent {
        RedactionIntent {
            target_height,
            tx_index,
            kind: RedactionKind::Delete,
            reason: "GDPR erasure".into(),
            replacement: None,
        }
    }

    // =========================================================================
    // SCENARIO A: REPRODUCIBLE LOTTERY
    // =========================================================================

    fn scenario_a_config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.seed = 42;
        config.nodes = vec![
            NodeSpec::new(Role::Admin, 0.5),
            NodeSpec::new(Role::Regulator, 0.3),
            NodeSpec::new(Role::Miner, 0.2),
        ];
        config.end_time = 10 * config.block_interval;
        config.redaction.enabled = false;
        config
    }

    /// Winners of the first ten lotteries drawn from seed 42.
    const SCENARIO_A_MINERS: [u32; 10] = [1, 1, 1, 0, 0, 0, 1, 2, 0, 0];

    #[test]
    fn test_scenario_a_miner_sequence_is_reproducible() {
        let first = Simulation::new(scenario_a_config()).unwrap().run().unwrap();
        let second = Simulation::new(scenario_a_config()).unwrap().run().unwrap();

        let expected: Vec<NodeId> = SCENARIO_A_MINERS.iter().map(|&i| NodeId(i)).collect();
        assert_eq!(first.miner_sequence, expected);
        assert_eq!(second.miner_sequence, expected);
        assert_eq!(first.max_height(), 10);
    }

    #[test]
    fn test_scenario_a_sequence_ignores_workload_and_redaction() {
        let mut config = scenario_a_config();
        config.redaction.enabled = true;
        config.workload.txs_per_block = 25;
        config.mean_propagation_delay = 2_000;
        let report = Simulation::new(config).unwrap().run().unwrap();

        let expected: Vec<NodeId> = SCENARIO_A_MINERS.iter().map(|&i| NodeId(i)).collect();
        assert_eq!(report.miner_sequence, expected);
    }

    #[test]
    fn test_scenario_a_zero_share_node_never_mines() {
        let mut config = scenario_a_config();
        config.nodes.push(NodeSpec::new(Role::Observer, 0.0));
        config.end_time = 40 * config.block_interval;
        let report = Simulation::new(config).unwrap().run().unwrap();
        assert_eq!(report.miner_sequence.len(), 40);
        assert!(!report.miner_sequence.contains(&NodeId(3)));
        assert_eq!(report.nodes[3].stats.blocks_mined, 0);
    }

    // =========================================================================
    // SCENARIO B: ROLE-GATED QUORUM
    // =========================================================================

    #[test]
    fn test_scenario_b_user_approval_not_counted() {
        let mut net = network(&[Role::Admin, Role::User, Role::Regulator], vec![gdpr_policy()]);
        net.shared_prefix(2, 3);

        let request = net.engine.submit(&net.nodes[0], &delete_intent(1, 0), 500).unwrap();
        net.engine.approve(request, &net.nodes[0], 510).unwrap();
        let refused = net.engine.approve(request, &net.nodes[1], 520);
        assert!(matches!(
            refused,
            Err(RedactionError::IneligibleApprover { node: NodeId(1), .. })
        ));

        let state = net.engine.request(request).unwrap();
        assert_eq!(state.approvals.len(), 1);
        assert_eq!(state.status, RedactionStatus::Pending);
        assert!(net.engine.poll(600).is_empty());
    }

    // =========================================================================
    // SCENARIO C: DELETE KEEPS THE CHAIN VALID
    // =========================================================================

    #[test]
    fn test_scenario_c_delete_preserves_id_and_links() {
        let mut net = network(&[Role::Admin, Role::Regulator, Role::Miner], vec![gdpr_policy()]);
        net.shared_prefix(7, 4);
        let before = net.nodes[0].chain().get_by_height(5).unwrap().clone();

        let request = net.engine.submit(&net.nodes[1], &delete_intent(5, 2), 1_000).unwrap();
        net.engine.approve(request, &net.nodes[0], 1_010).unwrap();
        net.engine.approve(request, &net.nodes[1], 1_020).unwrap();
        let redacted = net.engine.execute_redaction(request, &mut net.nodes, 1_030).unwrap();

        assert_eq!(redacted.id.hash, before.id.hash);
        assert_eq!(redacted.transactions.len(), before.transactions.len() - 1);
        assert_eq!(redacted.redaction_history.len(), before.redaction_history.len() + 1);
        assert!(!redacted.transactions.contains(&before.transactions[2]));

        // Propagate to the other nodes like the runtime does.
        for i in 1..net.nodes.len() {
            assert_eq!(net.deliver(i, &redacted, 1_100), BlockStatus::RedactionApplied);
            assert_eq!(net.deliver(i, &redacted, 1_200), BlockStatus::Duplicate);
        }
        for node in &net.nodes {
            let chain = node.chain();
            chain.verify_integrity(&net.hasher).unwrap();
            assert_eq!(chain.get_by_height(5), Some(&redacted));
            assert_eq!(&chain.get_by_height(6).unwrap().previous_id, redacted.hash());
        }
    }

    #[test]
    fn test_stale_copy_does_not_undo_redaction() {
        let mut net = network(&[Role::Admin, Role::Regulator], vec![gdpr_policy()]);
        net.shared_prefix(3, 2);
        let original = net.nodes[1].chain().get_by_height(2).unwrap().clone();

        let request = net.engine.submit(&net.nodes[0], &delete_intent(2, 0), 500).unwrap();
        net.engine.approve(request, &net.nodes[0], 510).unwrap();
        net.engine.approve(request, &net.nodes[1], 520).unwrap();
        let redacted = net.engine.execute_redaction(request, &mut net.nodes, 530).unwrap();

        assert_eq!(net.deliver(0, &original, 600), BlockStatus::Duplicate);
        assert_eq!(net.nodes[0].chain().get_by_height(2), Some(&redacted));
    }

    // =========================================================================
    // SCENARIO D: FORK RESOLUTION
    // =========================================================================

    #[test]
    fn test_scenario_d_equal_height_keeps_first_then_reorgs() {
        let mut net = network(&[Role::Miner, Role::Miner, Role::Miner], Vec::new());
        net.shared_prefix(9, 1);

        let block_a = net.mine(0, 1, 1_000);
        let block_b = net.mine(1, 1, 1_000);
        assert_eq!(block_a.height, 10);
        assert_eq!(block_b.height, 10);

        assert_eq!(net.deliver(2, &block_a, 1_010), BlockStatus::Extended);
        assert_eq!(net.deliver(2, &block_b, 1_020), BlockStatus::Forked);
        assert_eq!(net.nodes[2].chain().tip(), &block_a);
        assert_eq!(net.nodes[2].sync_state(), SyncState::Forked);

        let block_b11 = net.mine(1, 1, 1_100);
        assert_eq!(block_b11.height, 11);
        assert_eq!(
            net.deliver(2, &block_b11, 1_110),
            BlockStatus::Reorganized { displaced: 1 }
        );
        let chain = net.nodes[2].chain();
        assert_eq!(chain.tip(), &block_b11);
        assert_eq!(chain.get_by_height(10), Some(&block_b));
        assert_eq!(net.nodes[2].sync_state(), SyncState::Synced);
        assert_eq!(net.nodes[2].stats().reorgs, 1);
        chain.verify_integrity(&net.hasher).unwrap();
    }

    // =========================================================================
    // PROPERTY: ANY SEQUENCE OF REDACTIONS KEEPS THE CHAIN VALID
    // =========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(12))]

        #[test]
        fn test_redactions_never_break_links(
            targets in prop::collection::vec((1u64..=5, 0usize..3, 0usize..3), 1..5)
        ) {
            let mut net = network(&[Role::Admin, Role::Regulator], Vec::new());
            net.shared_prefix(5, 3);
            let ids: Vec<_> = net.nodes[0].chain().iter().map(|b| b.hash().clone()).collect();

            for (height, tx_index, kind) in targets {
                let kind = RedactionKind::ALL[kind];
                let len = net.nodes[0].chain().get_by_height(height).unwrap().transactions.len();
                if tx_index >= len {
                    continue;
                }
                let intent = RedactionIntent {
                    target_height: height,
                    tx_index,
                    kind,
                    reason: String::new(),
                    replacement: None,
                };
                let request = net.engine.submit(&net.nodes[0], &intent, 0).unwrap();
                net.engine.approve(request, &net.nodes[0], 0).unwrap();
                net.engine.approve(request, &net.nodes[1], 0).unwrap();
                net.engine.execute_redaction(request, &mut net.nodes, 0).unwrap();
            }

            let chain = net.nodes[0].chain();
            prop_assert!(chain.verify_integrity(&net.hasher).is_ok());
            let after: Vec<_> = chain.iter().map(|b| b.hash().clone()).collect();
            prop_assert_eq!(ids, after);
        }
    }
}
