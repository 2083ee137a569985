//! # Block Propagation
//!
//! Every block that leaves a node (freshly mined or freshly redacted) is
//! delivered to every other node as its own `ReceiveBlock` event with an
//! independent propagation delay. Orphans time out at the receiving node
//! after each delivery and at every node on each mining or redaction tick.

use rc_01_ledger::Block;
use rc_02_node::Node;
use rc_03_scheduler::{EventKind, Scheduler, SchedulerResult};
use rc_04_consensus::BlockStatus;
use shared_types::{LogicalTime, NodeId};
use tracing::{debug, warn};

use crate::container::SimulationContainer;
use crate::errors::RuntimeResult;

/// Schedule delivery of `block` from `origin` to every other node.
pub fn broadcast(scheduler: &mut Scheduler, nodes: &[Node], origin: NodeId, block: &Block) -> SchedulerResult<()> {
    for peer in nodes.iter().map(Node::id).filter(|id| *id != origin) {
        let delay = scheduler.propagation_delay();
        scheduler.schedule_after(
            delay,
            EventKind::ReceiveBlock {
                node: peer,
                block: Box::new(block.clone()),
            },
        )?;
    }
    Ok(())
}

impl SimulationContainer {
    /// Handle a block arriving at `node`.
    ///
    /// Non-fatal consensus errors are logged; orphan expiry runs after every
    /// delivery.
    pub fn on_receive_block(&mut self, node: NodeId, block: Block, now: LogicalTime) -> RuntimeResult<()> {
        let index = self.node_index(node)?;
        let height = block.height;

        match self.consensus.on_receive_block(&mut self.nodes[index], block, now) {
            Ok(outcome) => {
                if let BlockStatus::Rejected(reason) = &outcome.status {
                    self.stats.blocks_rejected += 1;
                    warn!(node = %node, height, reason = %reason, "Block rejected");
                } else {
                    debug!(node = %node, height, status = ?outcome.status, orphans = outcome.orphans_connected, "Block received");
                }
            }
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => warn!(node = %node, height, error = %e, "Block reception failed"),
        }

        let expired = self.consensus.expire_orphans(&mut self.nodes[index], now);
        self.stats.orphan_timeouts += expired.len() as u64;
        Ok(())
    }

    /// Drop timed-out orphans at every node.
    ///
    /// Runs on mining and redaction ticks so a node that stops receiving
    /// blocks still releases its stale orphans.
    pub fn expire_orphans_everywhere(&mut self, now: LogicalTime) -> usize {
        let mut expired = 0;
        for node in &mut self.nodes {
            expired += self.consensus.expire_orphans(node, now).len();
        }
        self.stats.orphan_timeouts += expired as u64;
        expired
    }
}
