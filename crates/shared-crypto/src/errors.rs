//! Crypto error types.

use thiserror::Error;

/// Chameleon-hash and secret-sharing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// An input scalar lies outside its valid range.
    #[error("Domain error: {0}")]
    DomainError(&'static str),

    /// The trapdoor cannot be used (missing or insufficient shares).
    #[error("Trapdoor unavailable: {0}")]
    TrapdoorUnavailable(String),

    /// Threshold parameters are inconsistent.
    #[error("Invalid threshold: need {threshold} of {total}")]
    InvalidThreshold {
        /// Shares required
        threshold: usize,
        /// Shares issued
        total: usize,
    },

    /// Two shares carry the same evaluation point.
    #[error("Duplicate share index {0}")]
    DuplicateShareIndex(u32),

    /// Share index zero would leak the secret.
    #[error("Share index must be non-zero")]
    ZeroShareIndex,
}

impl CryptoError {
    /// Returns true if the caller can recover by collecting more material.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::TrapdoorUnavailable(_))
    }
}

/// Result alias for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;
