//! # Error Types
//!
//! Defines error types shared across subsystems.

use crate::entities::NodeId;
use thiserror::Error;

/// Errors raised while validating a `SimulationConfig`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The node roster is empty.
    #[error("Node roster is empty")]
    EmptyRoster,

    /// No node has a positive hash-rate share.
    #[error("No node has a positive hash-rate share")]
    NoMiners,

    /// A hash-rate share is negative or not finite.
    #[error("Invalid hash-rate share {share} for {node}")]
    InvalidHashShare { node: NodeId, share: f64 },

    /// Block interval must be positive.
    #[error("Block interval must be greater than zero")]
    ZeroBlockInterval,

    /// Redaction tick interval must be positive when redaction is enabled.
    #[error("Redaction tick interval must be greater than zero")]
    ZeroTickInterval,

    /// A probability or ratio outside `[0, 1]`.
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },

    /// A referenced node is not in the roster.
    #[error("Unknown node referenced in configuration: {0}")]
    UnknownNode(NodeId),

    /// The same node is listed twice as a share holder.
    #[error("Duplicate trapdoor share holder")]
    DuplicateShareHolder,

    /// Threshold is zero or larger than the number of holders.
    #[error("Invalid threshold {threshold} for {holders} share holders")]
    InvalidThreshold { threshold: usize, holders: usize },

    /// A policy that can never reach quorum semantics.
    #[error("Policy {0} requires zero approvals")]
    ZeroApprovals(String),
}
