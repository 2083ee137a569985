//! Error types for node-local chain bookkeeping

use rc_01_ledger::LedgerError;

/// Node error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeError {
    #[error("Fork point at height {0} is not on the main chain")]
    UnknownForkPoint(u64),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl NodeError {
    /// Errors that must halt the simulation.
    pub fn is_fatal(&self) -> bool {
        match self {
            NodeError::Ledger(e) => e.is_fatal(),
            NodeError::UnknownForkPoint(_) => false,
        }
    }
}

/// Result type for node operations
pub type NodeResult<T> = Result<T, NodeError>;
