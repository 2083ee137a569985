//! # Mining
//!
//! One lottery per block interval: the winner assembles a block on its own
//! tip, the block is broadcast, on-chain redaction requests are submitted,
//! and the next lottery is scheduled.

use rc_01_ledger::Block;
use rc_03_scheduler::{EventKind, Scheduler};
use rc_04_consensus::ContractExecutor;
use shared_types::NodeId;
use tracing::info;

use crate::container::SimulationContainer;
use crate::errors::RuntimeResult;
use crate::handlers::propagation::broadcast;

impl SimulationContainer {
    /// Draw a winner and schedule its `CreateBlock` one interval from now.
    pub fn schedule_next_block(&mut self, scheduler: &mut Scheduler) -> RuntimeResult<NodeId> {
        let winner = self.consensus.elect_leader(&self.nodes, scheduler.lottery_rng())?;
        scheduler.schedule_after(self.config.block_interval, EventKind::CreateBlock { node: winner })?;
        Ok(winner)
    }

    /// Handle `CreateBlock` for the lottery winner `node`.
    ///
    /// The next lottery is scheduled even if this block could not be built.
    pub fn on_create_block(&mut self, scheduler: &mut Scheduler, node: NodeId) -> RuntimeResult<()> {
        self.stats.miner_sequence.push(node);
        self.expire_orphans_everywhere(scheduler.now());
        let mined = self.mine_block(scheduler, node);
        let next = self.schedule_next_block(scheduler)?;
        let block = mined?;
        info!(height = block.height, miner = %node, next = %next, "Block interval complete");
        Ok(())
    }

    fn mine_block(&mut self, scheduler: &mut Scheduler, node: NodeId) -> RuntimeResult<Block> {
        let now = scheduler.now();
        let index = self.node_index(node)?;

        let contracts = self.consensus.executor().deployed_contracts();
        let transactions = self
            .workload
            .next_batch(scheduler.rng(), &self.nodes[index], &self.nodes, &contracts, now);
        let block = self
            .consensus
            .assemble_block(&mut self.nodes[index], transactions, now, scheduler.rng())?;

        broadcast(scheduler, &self.nodes, node, &block)?;
        self.submit_onchain_requests(&block, now);
        Ok(block)
    }
}
