//! # Redaction Governance
//!
//! Requests enter from `REDACTION_REQUEST` transactions in freshly mined
//! blocks or from externally scheduled submissions. Each new request is
//! queued for voting at every eligible node. On every `RedactionTick`:
//!
//! 1. timed-out orphans are dropped at every node
//! 2. each node works through its vote queue, approving with the configured
//!    probability and otherwise abstaining until the next tick
//! 3. open requests are evaluated (quorum, time lock, expiry)
//! 4. requests at quorum are executed and the redacted block is broadcast
//!
//! Requests carried on-chain are submitted by the block's miner.

use rand::Rng;
use rc_01_ledger::{Block, RedactionIntent, TxPayload};
use rc_02_node::Node;
use rc_03_scheduler::{EventKind, Scheduler};
use rc_05_redaction::{RedactionEngine, RedactionError};
use shared_types::{LogicalTime, NodeId, RequestId, ScheduledRedaction};
use tracing::{debug, info, warn};

use crate::container::{RuntimeStats, SimulationContainer};
use crate::errors::RuntimeResult;
use crate::handlers::propagation::broadcast;

impl SimulationContainer {
    /// Submit every redaction intent carried by a freshly mined block.
    ///
    /// The block's miner is the requester: the intent's target coordinates
    /// refer to its chain.
    pub fn submit_onchain_requests(&mut self, block: &Block, now: LogicalTime) {
        for tx in &block.transactions {
            if let TxPayload::RedactionIntent(intent) = &tx.payload {
                self.submit_request(block.miner, intent, now);
            }
        }
    }

    /// Handle an externally scheduled request.
    pub fn on_submit_redaction(&mut self, scheduled: ScheduledRedaction, now: LogicalTime) {
        let intent = RedactionIntent {
            target_height: scheduled.target_height,
            tx_index: scheduled.tx_index,
            kind: scheduled.kind,
            reason: scheduled.reason,
            replacement: None,
        };
        self.submit_request(scheduled.requester, &intent, now);
    }

    fn submit_request(&mut self, requester: NodeId, intent: &RedactionIntent, now: LogicalTime) -> Option<RequestId> {
        let engine = self.redaction.as_mut()?;
        let Some(node) = self.nodes.iter().find(|n| n.id() == requester) else {
            warn!(requester = %requester, "Redaction request from unknown node ignored");
            self.stats.redactions_refused += 1;
            return None;
        };

        match engine.submit(node, intent, now) {
            Ok(request) => {
                for voter in engine.eligible_voters(request, &self.nodes) {
                    if let Some(node) = self.nodes.iter_mut().find(|n| n.id() == voter) {
                        node.queue_vote(request);
                    }
                }
                Some(request)
            }
            Err(e) => {
                debug!(requester = %requester, error = %e, "Redaction request refused");
                self.stats.redactions_refused += 1;
                None
            }
        }
    }

    /// Handle a `RedactionTick` and schedule the next one.
    pub fn on_redaction_tick(&mut self, scheduler: &mut Scheduler) -> RuntimeResult<()> {
        let now = scheduler.now();
        self.expire_orphans_everywhere(now);
        let Some(engine) = self.redaction.as_mut() else {
            return Ok(());
        };

        let probability = self.config.redaction.approval_probability;
        cast_votes(engine, &mut self.nodes, &mut self.stats, scheduler, probability, now);

        for request in engine.poll(now) {
            let executor = match engine.request(request) {
                Some(r) => engine.executor_for(r),
                None => continue,
            };
            match engine.execute_redaction(request, &mut self.nodes, now) {
                Ok(block) => {
                    broadcast(scheduler, &self.nodes, executor, &block)?;
                    info!(request = %request, executor = %executor, height = block.height, "Redacted block propagated");
                }
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => debug!(request = %request, error = %e, "Redaction not executed"),
            }
        }

        scheduler.schedule_after(self.config.redaction.tick_interval, EventKind::RedactionTick)?;
        Ok(())
    }
}

fn cast_votes(
    engine: &mut RedactionEngine,
    nodes: &mut [Node],
    stats: &mut RuntimeStats,
    scheduler: &mut Scheduler,
    probability: f64,
    now: LogicalTime,
) {
    for index in 0..nodes.len() {
        let queued = nodes[index].take_pending_votes();
        for request in queued {
            if !scheduler.rng().gen_bool(probability) {
                stats.votes_abstained += 1;
                let open = engine.request(request).is_some_and(|r| !r.status.is_terminal());
                if open {
                    nodes[index].queue_vote(request);
                }
                continue;
            }
            match engine.approve(request, &nodes[index], now) {
                Ok(status) => debug!(request = %request, voter = %nodes[index].id(), status = %status, "Vote cast"),
                Err(RedactionError::RequestClosed { .. }) => {}
                Err(e) => {
                    stats.votes_refused += 1;
                    debug!(request = %request, voter = %nodes[index].id(), error = %e, "Vote refused");
                }
            }
        }
    }
}
