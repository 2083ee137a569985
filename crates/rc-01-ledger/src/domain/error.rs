//! Error types for the ledger data model

use shared_crypto::CryptoError;

/// Ledger error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// A block's chameleon id no longer matches its contents.
    ///
    /// Fatal: the chain-validity invariant is broken.
    #[error("Consistency violation at height {height}: {reason}")]
    ConsistencyViolation { height: u64, reason: String },

    #[error("Block at height {height} does not link to the chain tip")]
    LinkageMismatch { height: u64 },

    #[error("Invalid block height: expected {expected}, got {actual}")]
    InvalidHeight { expected: u64, actual: u64 },

    #[error("Unknown block at height {0}")]
    UnknownHeight(u64),

    #[error("Transaction index {index} out of range (block has {len})")]
    TxIndexOutOfRange { index: usize, len: usize },

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

impl LedgerError {
    /// Errors that must halt the simulation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LedgerError::ConsistencyViolation { .. })
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
