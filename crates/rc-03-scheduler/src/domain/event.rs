//! Scheduled events
//!
//! Events are ordered by `(time, seq)`: earliest time first, and insertion
//! order among events with equal timestamps.

use rc_01_ledger::Block;
use shared_types::{LogicalTime, NodeId, ScheduledRedaction};
use std::cmp::Ordering;

/// What happens when an event fires.
#[derive(Clone, Debug)]
pub enum EventKind {
    /// `node` won the mining lottery and builds a block on its tip.
    CreateBlock { node: NodeId },
    /// A copy of `block` arrives at `node`.
    ReceiveBlock { node: NodeId, block: Box<Block> },
    /// Periodic redaction housekeeping: voting, quorum checks, expiry.
    RedactionTick,
    /// An externally scheduled redaction request is submitted.
    SubmitRedaction(ScheduledRedaction),
}

impl EventKind {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::CreateBlock { .. } => "create_block",
            EventKind::ReceiveBlock { .. } => "receive_block",
            EventKind::RedactionTick => "redaction_tick",
            EventKind::SubmitRedaction(_) => "submit_redaction",
        }
    }
}

/// An event with its firing time and insertion sequence.
#[derive(Clone, Debug)]
pub struct ScheduledEvent {
    pub time: LogicalTime,
    pub seq: u64,
    pub kind: EventKind,
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.seq == other.seq
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    /// Reversed so that `BinaryHeap` pops the earliest event.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .cmp(&self.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}
