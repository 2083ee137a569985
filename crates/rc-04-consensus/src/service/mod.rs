//! Consensus Service - Core business logic
//!
//! # Responsibilities
//! - Draw the winning miner of each block interval
//! - Assemble and seal the winner's block on its own tip
//! - Classify every received block (extend, side branch, fork, reorg, orphan)
//! - Propagate redacted copies of known blocks
//! - Expire orphans that never connect

use crate::domain::{select_leader, ConsensusError, ConsensusResult, ForkChoice};
use crate::ports::ContractExecutor;
use rand::Rng;
use rc_01_ledger::{Block, BlockTemplate, ExecutionReceipt, Transaction, TxPayload};
use rc_02_node::{Node, NodeError, SyncEvent};
use shared_crypto::{BigUint, ChameleonHash};
use shared_types::{ConsensusSettings, LogicalTime, NodeId};
use std::cmp::Ordering;
use tracing::{debug, info, warn};

/// How a received block was handled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockStatus {
    /// Appended on top of the tip.
    Extended,
    /// Stored on a lighter side branch.
    SideBranch,
    /// Stored on a side branch of equal weight; the node is FORKED.
    Forked,
    /// The block's branch became the main chain.
    Reorganized { displaced: usize },
    /// Parent unknown; buffered.
    Orphaned,
    /// Already known, and the copy does not supersede the stored block.
    Duplicate,
    /// Replaced the stored copy with a more-redacted one.
    RedactionApplied,
    /// Failed validation.
    Rejected(String),
}

/// Result of `on_receive_block`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceiveOutcome {
    pub status: BlockStatus,
    /// Orphans connected as a consequence of this block.
    pub orphans_connected: usize,
}

/// Dependencies for ConsensusService
pub struct ConsensusDependencies<X> {
    pub executor: X,
    pub hasher: ChameleonHash,
    pub settings: ConsensusSettings,
}

/// Consensus Service
pub struct ConsensusService<X: ContractExecutor> {
    executor: X,
    hasher: ChameleonHash,
    fork_choice: ForkChoice,
    settings: ConsensusSettings,
}

impl<X: ContractExecutor> ConsensusService<X> {
    /// Create a new ConsensusService
    pub fn new(deps: ConsensusDependencies<X>) -> Self {
        Self {
            executor: deps.executor,
            hasher: deps.hasher,
            fork_choice: ForkChoice::new(deps.settings.fork_choice),
            settings: deps.settings,
        }
    }

    pub fn executor(&self) -> &X {
        &self.executor
    }

    pub fn hasher(&self) -> &ChameleonHash {
        &self.hasher
    }

    pub fn fork_choice(&self) -> ForkChoice {
        self.fork_choice
    }

    // === LEADER ELECTION ===

    /// Draw the next block producer among `nodes`.
    pub fn elect_leader<R: Rng + ?Sized>(&self, nodes: &[Node], rng: &mut R) -> ConsensusResult<NodeId> {
        select_leader(nodes.iter().map(|n| (n.id(), n.hash_rate_share())), rng)
    }

    // === BLOCK ASSEMBLY ===

    /// Build, seal and append a block on `node`'s tip.
    ///
    /// Contract transactions are executed first; failures are logged and leave
    /// the transaction in the block without a receipt. Returns a copy of the
    /// sealed block for propagation.
    pub fn assemble_block<R: Rng + ?Sized>(
        &mut self,
        node: &mut Node,
        transactions: Vec<Transaction>,
        now: LogicalTime,
        rng: &mut R,
    ) -> ConsensusResult<Block> {
        let receipts = self.execute_contracts(&transactions);
        let parent = node.chain().tip();
        let template = BlockTemplate {
            previous_id: parent.hash().clone(),
            height: parent.height + 1,
            transactions,
            miner: node.id(),
            timestamp: now,
            difficulty: self.settings.difficulty,
            receipts,
        };
        let block = Block::seal(&self.hasher, template, rng);

        node.chain_mut()
            .append(block.clone())
            .map_err(NodeError::from)?;
        node.observe(SyncEvent::TipExtended);
        node.record_mined();

        info!(
            node = %node.id(),
            height = block.height,
            id = %block.id,
            txs = block.transactions.len(),
            receipts = block.receipts.len(),
            "Mined block"
        );
        Ok(block)
    }

    fn execute_contracts(&mut self, transactions: &[Transaction]) -> Vec<ExecutionReceipt> {
        let mut receipts = Vec::new();
        for tx in transactions {
            let result = match &tx.payload {
                TxPayload::ContractCall(call) => self.executor.execute(call),
                TxPayload::ContractDeploy(deploy) => self.executor.deploy(deploy, tx.id),
                _ => continue,
            };
            match result {
                Ok(delta) => receipts.push(ExecutionReceipt { tx_id: tx.id, delta }),
                Err(e) => warn!(tx = %tx.id, error = %e, "Contract execution failed"),
            }
        }
        receipts
    }

    // === BLOCK RECEPTION ===

    /// Process a block arriving at `node`.
    ///
    /// After the block itself is placed, any orphans waiting on it (directly
    /// or transitively) are connected.
    pub fn on_receive_block(
        &self,
        node: &mut Node,
        block: Block,
        now: LogicalTime,
    ) -> ConsensusResult<ReceiveOutcome> {
        if !block.verify_identity(&self.hasher) {
            warn!(node = %node.id(), height = block.height, "Rejected block with invalid chameleon id");
            return Ok(ReceiveOutcome {
                status: BlockStatus::Rejected("chameleon id does not match contents".into()),
                orphans_connected: 0,
            });
        }

        if node.knows_block(block.hash()) {
            let height = block.height;
            let status = if node.apply_redacted_block(block) {
                info!(node = %node.id(), height, "Applied redacted block copy");
                BlockStatus::RedactionApplied
            } else {
                BlockStatus::Duplicate
            };
            return Ok(ReceiveOutcome {
                status,
                orphans_connected: 0,
            });
        }

        if !node.knows_block(&block.previous_id) {
            let height = block.height;
            let status = if node.buffer_orphan(block, now) {
                debug!(node = %node.id(), height, "Buffered orphan block");
                BlockStatus::Orphaned
            } else {
                BlockStatus::Duplicate
            };
            return Ok(ReceiveOutcome {
                status,
                orphans_connected: 0,
            });
        }

        let id = block.hash().clone();
        let status = self.connect(node, block)?;
        let orphans_connected = if matches!(status, BlockStatus::Rejected(_)) {
            0
        } else {
            self.connect_orphans(node, id)?
        };
        Ok(ReceiveOutcome {
            status,
            orphans_connected,
        })
    }

    /// Place a block whose parent is known.
    fn connect(&self, node: &mut Node, block: Block) -> ConsensusResult<BlockStatus> {
        let parent_height = match node.find_block(&block.previous_id) {
            Some(parent) => parent.height,
            None => return Ok(BlockStatus::Rejected("parent unknown".into())),
        };
        if block.height != parent_height + 1 {
            warn!(node = %node.id(), height = block.height, parent_height, "Rejected block with bad height");
            return Ok(BlockStatus::Rejected(format!(
                "height {} does not follow parent height {}",
                block.height, parent_height
            )));
        }

        if &block.previous_id == node.chain().tip().hash() {
            node.chain_mut()
                .append(block)
                .map_err(NodeError::from)?;
            node.observe(SyncEvent::TipExtended);
            return Ok(BlockStatus::Extended);
        }

        let id = block.hash().clone();
        node.store_side_block(block);
        let Some(branch) = node.branch_to(&id) else {
            return Ok(BlockStatus::SideBranch);
        };

        match self.fork_choice.compare(node.chain(), &branch) {
            Ordering::Greater => {
                node.observe(SyncEvent::HeavierBranch);
                let fork_height = branch.fork_height;
                let displaced = node.adopt_branch(branch)?;
                node.observe(SyncEvent::ReorgComplete);
                info!(
                    node = %node.id(),
                    fork_height,
                    displaced,
                    new_height = node.chain().height(),
                    "Reorganized to heavier branch"
                );
                Ok(BlockStatus::Reorganized { displaced })
            }
            Ordering::Equal => {
                node.observe(SyncEvent::EqualBranch);
                debug!(node = %node.id(), height = node.chain().height(), "Competing branch of equal weight");
                Ok(BlockStatus::Forked)
            }
            Ordering::Less => {
                node.observe(SyncEvent::LighterBranch);
                Ok(BlockStatus::SideBranch)
            }
        }
    }

    fn connect_orphans(&self, node: &mut Node, root: BigUint) -> ConsensusResult<usize> {
        let mut connected = 0;
        let mut ready = vec![root];
        while let Some(parent) = ready.pop() {
            for orphan in node.take_orphans_for(&parent) {
                let id = orphan.hash().clone();
                match self.connect(node, orphan)? {
                    BlockStatus::Rejected(reason) => {
                        debug!(node = %node.id(), reason = %reason, "Dropped orphan on connect");
                    }
                    _ => {
                        connected += 1;
                        ready.push(id);
                    }
                }
            }
        }
        if connected > 0 {
            debug!(node = %node.id(), connected, "Connected orphans");
        }
        Ok(connected)
    }

    // === ORPHAN EXPIRY ===

    /// Drop orphans older than the configured timeout.
    ///
    /// Each drop is returned as a non-fatal `OrphanBlockTimeout`.
    pub fn expire_orphans(&self, node: &mut Node, now: LogicalTime) -> Vec<ConsensusError> {
        node.expire_orphans(now, self.settings.orphan_timeout)
            .into_iter()
            .map(|orphan| {
                let error = ConsensusError::OrphanBlockTimeout {
                    node: node.id(),
                    height: orphan.block.height,
                    waited: now.saturating_sub(orphan.received_at),
                };
                warn!(error = %error, "Orphan expired");
                error
            })
            .collect()
    }
}
