//! Error types for Consensus subsystem

use rc_01_ledger::ContractAddress;
use rc_02_node::NodeError;
use shared_types::{LogicalTime, NodeId};

/// Consensus error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsensusError {
    #[error("No node has a positive hash-rate share")]
    NoEligibleMiner,

    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    /// An orphan waited too long for its parent and was dropped.
    #[error("Orphan block at height {height} dropped by {node} after {waited} ticks")]
    OrphanBlockTimeout {
        node: NodeId,
        height: u64,
        waited: LogicalTime,
    },

    #[error("Node error: {0}")]
    Node(#[from] NodeError),
}

impl ConsensusError {
    /// Errors that must halt the simulation.
    pub fn is_fatal(&self) -> bool {
        match self {
            ConsensusError::Node(e) => e.is_fatal(),
            _ => false,
        }
    }

    /// Errors that are reported and otherwise ignored.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ConsensusError::OrphanBlockTimeout { .. })
    }
}

/// Contract execution failures. The transaction stays in the block without a
/// receipt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    #[error("Unknown contract: {0}")]
    UnknownContract(ContractAddress),

    #[error("Out of gas: required {required}, limit {limit}")]
    OutOfGas { required: u64, limit: u64 },
}

/// Result type for consensus operations
pub type ConsensusResult<T> = Result<T, ConsensusError>;
