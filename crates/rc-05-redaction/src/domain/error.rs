//! Error types for the redaction subsystem

use super::request::RedactionStatus;
use rc_01_ledger::LedgerError;
use shared_types::{NodeId, RequestId};

/// Redaction error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RedactionError {
    /// The requester's role may not request this kind of redaction.
    #[error("Policy violation: {0}")]
    PolicyViolation(String),

    /// The voter is not eligible or has already voted.
    #[error("Ineligible approver {node}: {reason}")]
    IneligibleApprover { node: NodeId, reason: String },

    #[error("Unknown redaction request: {0}")]
    UnknownRequest(RequestId),

    #[error("Request {request} is closed with status {status}")]
    RequestClosed { request: RequestId, status: RedactionStatus },

    #[error("Request {request} is not ready for execution (status {status})")]
    NotReady { request: RequestId, status: RedactionStatus },

    #[error("No block at height {0} on the requester's chain")]
    TargetNotFound(u64),

    #[error("Target not redactable: {0}")]
    TargetNotRedactable(String),

    #[error("Transaction index {index} out of range (block has {len})")]
    TxIndexOutOfRange { index: usize, len: usize },

    /// Forging, proof generation or verification failed.
    #[error("Redaction failed: {0}")]
    RedactionFailed(String),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl RedactionError {
    /// Errors that must halt the simulation.
    pub fn is_fatal(&self) -> bool {
        match self {
            RedactionError::Ledger(e) => e.is_fatal(),
            _ => false,
        }
    }

    /// Errors that only affect a single request or vote.
    pub fn is_recoverable(&self) -> bool {
        !self.is_fatal()
    }
}

/// Result type for redaction operations
pub type RedactionResult<T> = Result<T, RedactionError>;
