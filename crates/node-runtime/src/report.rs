//! # Run Report
//!
//! Summary emitted at the end of a run: mining and fork statistics per
//! node, redaction outcomes by status, and an integrity check of every
//! node's chain.

use std::collections::BTreeMap;

use rc_02_node::{Node, NodeStats, SyncState};
use rc_03_scheduler::RunSummary;
use rc_04_consensus::ContractExecutor;
use rc_05_redaction::{RedactionEngine, RedactionRequest, RedactionStatus};
use serde::Serialize;
use shared_crypto::ChameleonHash;
use shared_types::{LogicalTime, NodeId, RedactionKind, RequestId, Role};

use crate::container::SimulationContainer;

/// Whole-run summary.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub seed: u64,
    pub final_time: LogicalTime,
    pub events_processed: u64,
    pub events_remaining: usize,
    /// Lottery winners in order.
    pub miner_sequence: Vec<NodeId>,
    /// Highest height at which every node holds the same block.
    pub common_prefix_height: u64,
    pub transactions_generated: u64,
    pub contracts_deployed: usize,
    pub blocks_rejected: u64,
    pub orphan_timeouts: u64,
    pub nodes: Vec<NodeReport>,
    /// `None` when redaction is disabled.
    pub redaction: Option<RedactionReport>,
}

/// Final state of one node.
#[derive(Debug, Clone, Serialize)]
pub struct NodeReport {
    pub id: NodeId,
    pub role: Role,
    pub hash_rate_share: f64,
    pub height: u64,
    /// Hex prefix of the tip id.
    pub tip: String,
    pub sync_state: SyncState,
    pub orphans_buffered: usize,
    pub side_blocks: usize,
    /// Main-chain blocks carrying at least one redaction record.
    pub redacted_blocks: usize,
    pub stats: NodeStats,
    /// Why `verify_integrity` failed, if it did.
    pub integrity_error: Option<String>,
}

/// Redaction governance outcomes.
#[derive(Debug, Clone, Serialize)]
pub struct RedactionReport {
    pub by_status: BTreeMap<RedactionStatus, usize>,
    pub refused_at_submission: u64,
    pub votes_refused: u64,
    pub votes_abstained: u64,
    pub requests: Vec<RequestReport>,
}

/// Final state of one request.
#[derive(Debug, Clone, Serialize)]
pub struct RequestReport {
    pub id: RequestId,
    pub kind: RedactionKind,
    pub requester: NodeId,
    pub policy: Option<String>,
    pub target_height: u64,
    pub approvals: usize,
    pub required_approvals: usize,
    pub status: RedactionStatus,
    pub outcome: Option<String>,
}

impl RunReport {
    /// Collect the report from the final simulation state.
    pub fn collect(container: &SimulationContainer, summary: &RunSummary) -> Self {
        Self {
            seed: container.config.seed,
            final_time: summary.final_time,
            events_processed: summary.events_processed,
            events_remaining: summary.events_remaining,
            miner_sequence: container.stats.miner_sequence.clone(),
            common_prefix_height: common_prefix_height(&container.nodes),
            transactions_generated: container.workload.generated(),
            contracts_deployed: container.consensus.executor().deployed_contracts().len(),
            blocks_rejected: container.stats.blocks_rejected,
            orphan_timeouts: container.stats.orphan_timeouts,
            nodes: container
                .nodes
                .iter()
                .map(|n| NodeReport::collect(n, &container.hasher))
                .collect(),
            redaction: container
                .redaction
                .as_ref()
                .map(|engine| RedactionReport::collect(engine, container)),
        }
    }

    /// Whether every node's chain passed the integrity walk.
    pub fn integrity_ok(&self) -> bool {
        self.nodes.iter().all(|n| n.integrity_error.is_none())
    }

    /// Height of the longest main chain.
    pub fn max_height(&self) -> u64 {
        self.nodes.iter().map(|n| n.height).max().unwrap_or(0)
    }
}

impl NodeReport {
    fn collect(node: &Node, hasher: &ChameleonHash) -> Self {
        let chain = node.chain();
        let tip_hex = chain.tip().id.hash_hex();
        Self {
            id: node.id(),
            role: node.role(),
            hash_rate_share: node.hash_rate_share(),
            height: chain.height(),
            tip: tip_hex.chars().take(16).collect(),
            sync_state: node.sync_state(),
            orphans_buffered: node.orphan_count(),
            side_blocks: node.side_block_count(),
            redacted_blocks: chain.iter().filter(|b| !b.redaction_history.is_empty()).count(),
            stats: node.stats().clone(),
            integrity_error: chain.verify_integrity(hasher).err().map(|e| e.to_string()),
        }
    }
}

impl RedactionReport {
    fn collect(engine: &RedactionEngine, container: &SimulationContainer) -> Self {
        let mut requests: Vec<RequestReport> = engine
            .archived()
            .iter()
            .chain(engine.active())
            .map(RequestReport::from)
            .collect();
        requests.sort_by_key(|r| r.id);
        Self {
            by_status: engine.status_counts(),
            refused_at_submission: container.stats.redactions_refused,
            votes_refused: container.stats.votes_refused,
            votes_abstained: container.stats.votes_abstained,
            requests,
        }
    }
}

impl From<&RedactionRequest> for RequestReport {
    fn from(request: &RedactionRequest) -> Self {
        Self {
            id: request.request_id,
            kind: request.kind,
            requester: request.requester,
            policy: request.policy_id.clone(),
            target_height: request.target_height,
            approvals: request.approvals.len(),
            required_approvals: request.required_approvals,
            status: request.status,
            outcome: request.outcome.clone(),
        }
    }
}

fn common_prefix_height(nodes: &[Node]) -> u64 {
    let Some(first) = nodes.first() else {
        return 0;
    };
    let mut agreed = 0;
    for block in first.chain().iter() {
        let shared = nodes
            .iter()
            .all(|n| n.chain().get_by_height(block.height).is_some_and(|b| b.hash() == block.hash()));
        if !shared {
            break;
        }
        agreed = block.height;
    }
    agreed
}
