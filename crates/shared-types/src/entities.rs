//! # Core Domain Entities
//!
//! Identifiers, roles and redaction kinds shared by every subsystem.
//!
//! ## Clusters
//!
//! - **Identity**: `NodeId`, `TxId`, `RequestId`
//! - **Time**: `LogicalTime`
//! - **Governance**: `Role`, `RedactionKind` and the role capability table

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// Logical simulation time in ticks.
pub type LogicalTime = u64;

/// Unique identifier for a simulated node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel written over sender/recipient fields by an ANONYMIZE redaction.
    pub const ANONYMOUS: NodeId = NodeId(u32::MAX);

    /// Whether this id is the anonymization sentinel.
    pub fn is_anonymous(&self) -> bool {
        *self == Self::ANONYMOUS
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_anonymous() {
            write!(f, "node-anon")
        } else {
            write!(f, "node-{}", self.0)
        }
    }
}

/// Unique identifier for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TxId(pub u64);

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tx-{:012x}", self.0)
    }
}

/// Unique identifier for a redaction request.
///
/// Issued sequentially so that runs with the same seed produce the same ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "redaction-{}", self.0)
    }
}

// =============================================================================
// CLUSTER B: GOVERNANCE
// =============================================================================

/// Kind of history rewrite a redaction request performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RedactionKind {
    /// Remove the target transaction from the block.
    Delete,
    /// Replace the payload of the target transaction.
    Modify,
    /// Overwrite identifying fields of the target transaction with a sentinel.
    Anonymize,
}

impl RedactionKind {
    /// All redaction kinds, in declaration order.
    pub const ALL: [RedactionKind; 3] = [Self::Delete, Self::Modify, Self::Anonymize];
}

impl fmt::Display for RedactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Delete => "DELETE",
            Self::Modify => "MODIFY",
            Self::Anonymize => "ANONYMIZE",
        };
        f.write_str(name)
    }
}

/// Permissioned role of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Full governance rights.
    Admin,
    /// Oversight rights: may request and approve privacy redactions.
    Regulator,
    /// Block producer without governance rights.
    Miner,
    /// Transacting participant.
    #[default]
    User,
    /// Read-only participant.
    Observer,
}

impl Role {
    /// All roles, in declaration order.
    pub const ALL: [Role; 5] = [Self::Admin, Self::Regulator, Self::Miner, Self::User, Self::Observer];

    /// Capability table: the redaction kinds a role may request when no
    /// explicit policy covers the kind.
    pub fn permitted_redactions(&self) -> &'static [RedactionKind] {
        match self {
            Role::Admin => &RedactionKind::ALL,
            Role::Regulator => &[RedactionKind::Delete, RedactionKind::Anonymize],
            Role::Miner | Role::User | Role::Observer => &[],
        }
    }

    /// Whether the capability table allows this role to request `kind`.
    pub fn may_request(&self, kind: RedactionKind) -> bool {
        self.permitted_redactions().contains(&kind)
    }

    /// Whether the capability table allows this role to vote on redactions.
    pub fn may_approve(&self) -> bool {
        match self {
            Role::Admin | Role::Regulator => true,
            Role::Miner | Role::User | Role::Observer => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Admin => "ADMIN",
            Role::Regulator => "REGULATOR",
            Role::Miner => "MINER",
            Role::User => "USER",
            Role::Observer => "OBSERVER",
        };
        f.write_str(name)
    }
}
