//! # Simulation Container
//!
//! Owns every piece of mutable simulation state except the scheduler:
//! the node roster, the consensus service, the redaction engine and the
//! workload generator. Handlers borrow disjoint fields, so no locking is
//! needed; each event handler runs to completion before the next pops.

use std::sync::Arc;

use rc_02_node::Node;
use rc_04_consensus::{ConsensusDependencies, ConsensusService, GasMeteredExecutor};
use rc_05_redaction::{CommitmentProofSystem, PolicyBook, RedactionDependencies, RedactionEngine};
use shared_crypto::ChameleonHash;
use shared_types::{NodeId, SimulationConfig};
use tracing::info;

use crate::errors::{RuntimeError, RuntimeResult};
use crate::genesis::Genesis;
use crate::workload::WorkloadGenerator;

/// Concrete consensus service with the in-memory contract executor.
pub type ConcreteConsensusService = ConsensusService<GasMeteredExecutor>;

/// Counters kept by the handlers for the run report.
#[derive(Debug, Clone, Default)]
pub struct RuntimeStats {
    /// Winning miner of each lottery, in order.
    pub miner_sequence: Vec<NodeId>,
    pub blocks_rejected: u64,
    pub orphan_timeouts: u64,
    /// Requests refused at submission (policy or target).
    pub redactions_refused: u64,
    /// Votes refused as ineligible or late.
    pub votes_refused: u64,
    pub votes_abstained: u64,
}

/// All simulation state driven by scheduler events.
pub struct SimulationContainer {
    /// Configuration (immutable after initialization).
    pub config: Arc<SimulationConfig>,
    pub nodes: Vec<Node>,
    pub consensus: ConcreteConsensusService,
    /// `None` when redaction is disabled.
    pub redaction: Option<RedactionEngine>,
    pub workload: WorkloadGenerator,
    pub hasher: ChameleonHash,
    pub stats: RuntimeStats,
}

impl SimulationContainer {
    /// Wire services around a freshly built genesis.
    pub fn new(config: Arc<SimulationConfig>, genesis: Genesis) -> Self {
        let consensus = ConsensusService::new(ConsensusDependencies {
            executor: GasMeteredExecutor::with_builtin_contracts(),
            hasher: genesis.hasher.clone(),
            settings: config.consensus.clone(),
        });

        let redaction = config.redaction.enabled.then(|| {
            RedactionEngine::new(RedactionDependencies {
                policies: PolicyBook::new(
                    config.redaction.policies.clone(),
                    config.redaction.default_min_approvals,
                ),
                approval_window: config.redaction.approval_window,
                hasher: genesis.hasher.clone(),
                custody: genesis.custody,
                proof_system: Some(Box::new(CommitmentProofSystem::new())),
            })
        });
        info!(
            nodes = genesis.nodes.len(),
            fork_choice = ?config.consensus.fork_choice,
            redaction = redaction.is_some(),
            "Simulation container initialized"
        );

        Self {
            workload: WorkloadGenerator::new(config.workload.clone()),
            config,
            nodes: genesis.nodes,
            consensus,
            redaction,
            hasher: genesis.hasher,
            stats: RuntimeStats::default(),
        }
    }

    /// Roster index of `id`.
    pub fn node_index(&self, id: NodeId) -> RuntimeResult<usize> {
        self.nodes
            .iter()
            .position(|n| n.id() == id)
            .ok_or(RuntimeError::UnknownNode(id))
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id() == id)
    }
}
