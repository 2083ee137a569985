//! # Runtime Errors
//!
//! Every subsystem error that can surface while wiring or running the
//! simulation. Only fatal errors stop the run; everything else is logged by
//! the handler that saw it.

use rc_01_ledger::LedgerError;
use rc_03_scheduler::SchedulerError;
use rc_04_consensus::ConsensusError;
use rc_05_redaction::RedactionError;
use shared_crypto::CryptoError;
use shared_types::{ConfigError, NodeId};
use thiserror::Error;

/// Runtime error types
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Key setup failed: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("Consensus error: {0}")]
    Consensus(#[from] ConsensusError),

    #[error("Redaction error: {0}")]
    Redaction(#[from] RedactionError),

    #[error("Event addressed to unknown node {0}")]
    UnknownNode(NodeId),
}

impl RuntimeError {
    /// Errors that must halt the simulation.
    pub fn is_fatal(&self) -> bool {
        match self {
            RuntimeError::Ledger(e) => e.is_fatal(),
            RuntimeError::Consensus(e) => e.is_fatal(),
            RuntimeError::Redaction(e) => e.is_fatal(),
            RuntimeError::Config(_)
            | RuntimeError::Crypto(_)
            | RuntimeError::Scheduler(_)
            | RuntimeError::UnknownNode(_) => true,
        }
    }
}

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;
