//! Simulated node
//!
//! A node exclusively owns its chain, its side-branch store, its orphan
//! buffer and its vote queue. Other nodes only ever see copies of its blocks,
//! delivered through scheduled events.

use super::error::{NodeError, NodeResult};
use super::sync::{SyncEvent, SyncState};
use rc_01_ledger::{Block, Chain};
use serde::Serialize;
use shared_crypto::{BigUint, KeyShare};
use shared_types::{LogicalTime, NodeId, NodeSpec, RequestId, Role};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// A block waiting for its parent.
#[derive(Clone, Debug)]
pub struct OrphanBlock {
    pub block: Block,
    pub received_at: LogicalTime,
}

/// A side branch that connects to the main chain.
#[derive(Clone, Debug)]
pub struct Branch {
    /// Height of the main-chain block the branch forks from.
    pub fork_height: u64,
    /// Branch blocks in ascending height order.
    pub blocks: Vec<Block>,
}

impl Branch {
    /// Height of the branch tip.
    pub fn tip_height(&self) -> u64 {
        self.blocks.last().map_or(self.fork_height, |b| b.height)
    }

    /// Sum of declared difficulty over branch blocks.
    pub fn difficulty(&self) -> u64 {
        self.blocks.iter().map(|b| b.difficulty).sum()
    }
}

/// Per-node counters surfaced in the run report.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NodeStats {
    pub blocks_mined: u64,
    pub forks_observed: u64,
    pub reorgs: u64,
    pub blocks_reorged: u64,
    pub orphans_dropped: u64,
    pub redacted_copies_applied: u64,
}

/// A participant in the simulated network.
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    role: Role,
    hash_rate_share: f64,
    chain: Chain,
    /// Known blocks off the main chain, by id.
    side_blocks: HashMap<BigUint, Block>,
    /// Orphans keyed by the parent id they wait for.
    orphans: HashMap<BigUint, Vec<OrphanBlock>>,
    sync_state: SyncState,
    pending_votes: VecDeque<RequestId>,
    key_share: Option<KeyShare>,
    stats: NodeStats,
}

impl Node {
    /// Create a node whose chain starts at `genesis`.
    pub fn new(id: NodeId, spec: &NodeSpec, genesis: Block) -> Self {
        Self {
            id,
            role: spec.role,
            hash_rate_share: spec.hash_rate_share,
            chain: Chain::new(genesis),
            side_blocks: HashMap::new(),
            orphans: HashMap::new(),
            sync_state: SyncState::Synced,
            pending_votes: VecDeque::new(),
            key_share: None,
            stats: NodeStats::default(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn hash_rate_share(&self) -> f64 {
        self.hash_rate_share
    }

    /// Main chain.
    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// Main chain, mutable (block appends and in-place redaction).
    pub fn chain_mut(&mut self) -> &mut Chain {
        &mut self.chain
    }

    pub fn sync_state(&self) -> SyncState {
        self.sync_state
    }

    /// Feed an observation into the sync state machine.
    pub fn observe(&mut self, event: SyncEvent) -> SyncState {
        let next = self.sync_state.next(event);
        if next == SyncState::Forked && self.sync_state != SyncState::Forked {
            self.stats.forks_observed += 1;
        }
        if next != self.sync_state {
            debug!(node = %self.id, from = ?self.sync_state, to = ?next, "Sync state transition");
        }
        self.sync_state = next;
        next
    }

    pub fn stats(&self) -> &NodeStats {
        &self.stats
    }

    /// Record a block this node mined.
    pub fn record_mined(&mut self) {
        self.stats.blocks_mined += 1;
    }

    // -------------------------------------------------------------------------
    // Block knowledge
    // -------------------------------------------------------------------------

    /// Whether the block is on the main chain or a side branch.
    pub fn knows_block(&self, id: &BigUint) -> bool {
        self.chain.contains(id) || self.side_blocks.contains_key(id)
    }

    /// Find a known block anywhere.
    pub fn find_block(&self, id: &BigUint) -> Option<&Block> {
        self.chain.get(id).or_else(|| self.side_blocks.get(id))
    }

    /// Store a block on a side branch.
    pub fn store_side_block(&mut self, block: Block) {
        self.side_blocks.insert(block.hash().clone(), block);
    }

    pub fn side_block_count(&self) -> usize {
        self.side_blocks.len()
    }

    /// Walk back from a side block to the main chain.
    ///
    /// Returns `None` if `tip` is not a side block or the walk hits an unknown
    /// ancestor.
    pub fn branch_to(&self, tip: &BigUint) -> Option<Branch> {
        let mut blocks = Vec::new();
        let mut cursor = self.side_blocks.get(tip)?;
        loop {
            blocks.push(cursor.clone());
            if let Some(ancestor) = self.chain.get(&cursor.previous_id) {
                blocks.reverse();
                return Some(Branch {
                    fork_height: ancestor.height,
                    blocks,
                });
            }
            cursor = self.side_blocks.get(&cursor.previous_id)?;
        }
    }

    /// Switch the main chain to `branch`.
    ///
    /// Displaced main-chain blocks move to the side store. Returns how many
    /// blocks were displaced.
    pub fn adopt_branch(&mut self, branch: Branch) -> NodeResult<usize> {
        if self.chain.get_by_height(branch.fork_height).is_none() {
            return Err(NodeError::UnknownForkPoint(branch.fork_height));
        }
        let displaced = self.chain.truncate(branch.fork_height);
        let displaced_count = displaced.len();
        for block in displaced {
            self.store_side_block(block);
        }
        for block in branch.blocks {
            self.side_blocks.remove(block.hash());
            self.chain.append(block)?;
        }
        self.stats.reorgs += 1;
        self.stats.blocks_reorged += displaced_count as u64;
        Ok(displaced_count)
    }

    /// Install a redacted copy of a known block.
    ///
    /// Accepted only when the copy supersedes the stored one.
    pub fn apply_redacted_block(&mut self, block: Block) -> bool {
        let applied = if self.chain.contains(block.hash()) {
            self.chain.replace_redacted(block)
        } else {
            match self.side_blocks.get_mut(block.hash()) {
                Some(existing) if block.supersedes(existing) => {
                    *existing = block;
                    true
                }
                _ => false,
            }
        };
        if applied {
            self.stats.redacted_copies_applied += 1;
        }
        applied
    }

    // -------------------------------------------------------------------------
    // Orphans
    // -------------------------------------------------------------------------

    /// Buffer a block whose parent is unknown.
    ///
    /// A copy of an already-buffered block replaces it only if it supersedes
    /// the buffered one; the original arrival time is kept. Returns
    /// whether the block was newly buffered.
    pub fn buffer_orphan(&mut self, block: Block, now: LogicalTime) -> bool {
        let waiting = self.orphans.entry(block.previous_id.clone()).or_default();
        match waiting.iter_mut().find(|o| o.block.hash() == block.hash()) {
            Some(existing) => {
                if block.supersedes(&existing.block) {
                    existing.block = block;
                }
                false
            }
            None => {
                waiting.push(OrphanBlock {
                    block,
                    received_at: now,
                });
                true
            }
        }
    }

    /// Whether a block is already buffered as an orphan.
    pub fn is_orphan(&self, block: &Block) -> bool {
        self.orphans
            .get(&block.previous_id)
            .is_some_and(|waiting| waiting.iter().any(|o| o.block.hash() == block.hash()))
    }

    /// Remove and return orphans waiting on `parent`.
    pub fn take_orphans_for(&mut self, parent: &BigUint) -> Vec<Block> {
        self.orphans
            .remove(parent)
            .map(|waiting| waiting.into_iter().map(|o| o.block).collect())
            .unwrap_or_default()
    }

    pub fn orphan_count(&self) -> usize {
        self.orphans.values().map(Vec::len).sum()
    }

    /// Drop orphans buffered for at least `timeout` ticks.
    pub fn expire_orphans(&mut self, now: LogicalTime, timeout: LogicalTime) -> Vec<OrphanBlock> {
        let mut dropped = Vec::new();
        self.orphans.retain(|_, waiting| {
            let (expired, kept): (Vec<_>, Vec<_>) = waiting
                .drain(..)
                .partition(|o| now.saturating_sub(o.received_at) >= timeout);
            dropped.extend(expired);
            *waiting = kept;
            !waiting.is_empty()
        });
        self.stats.orphans_dropped += dropped.len() as u64;
        dropped
    }

    // -------------------------------------------------------------------------
    // Governance
    // -------------------------------------------------------------------------

    /// Queue a redaction request for this node to vote on.
    pub fn queue_vote(&mut self, request: RequestId) {
        if !self.pending_votes.contains(&request) {
            self.pending_votes.push_back(request);
        }
    }

    /// Drain queued votes in arrival order.
    pub fn take_pending_votes(&mut self) -> Vec<RequestId> {
        self.pending_votes.drain(..).collect()
    }

    pub fn pending_vote_count(&self) -> usize {
        self.pending_votes.len()
    }

    /// Hand this node a trapdoor share.
    pub fn set_key_share(&mut self, share: KeyShare) {
        self.key_share = Some(share);
    }

    /// Copy of the held share, if any.
    pub fn key_share(&self) -> Option<KeyShare> {
        self.key_share.clone()
    }
}
