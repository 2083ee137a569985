//! Redaction request lifecycle
//!
//! State Machine:
//! ```text
//!                 approval
//!               ┌─────────┐
//!               ↓         │
//! [PENDING] ────┴─────────┘
//!     │
//!     ├── approvals ≥ required AND now ≥ time_lock_until ──→ [QUORUM_REACHED] ──forge ok──→ [EXECUTED]
//!     │
//!     ├── now > expires_at without quorum ──→ [EXPIRED]
//!     │
//!     └── policy / forge / proof failure ──→ [REJECTED]   (also from QUORUM_REACHED)
//! ```
//!
//! Transitions on time are lazy: they happen whenever the request is
//! examined, never on a timer.

use super::policy::PolicyDecision;
use rc_01_ledger::{Block, RedactionIntent, TxPayload};
use serde::Serialize;
use shared_crypto::BigUint;
use shared_types::{LogicalTime, NodeId, RedactionKind, RequestId, Role, TxId};
use std::collections::BTreeSet;
use std::fmt;

/// Lifecycle status of a redaction request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RedactionStatus {
    Pending,
    QuorumReached,
    Executed,
    Rejected,
    Expired,
}

impl RedactionStatus {
    /// Executed, rejected and expired requests never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Executed | Self::Rejected | Self::Expired)
    }
}

impl fmt::Display for RedactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "PENDING",
            Self::QuorumReached => "QUORUM_REACHED",
            Self::Executed => "EXECUTED",
            Self::Rejected => "REJECTED",
            Self::Expired => "EXPIRED",
        };
        f.write_str(name)
    }
}

/// A request to rewrite one historical transaction.
#[derive(Clone, Debug)]
pub struct RedactionRequest {
    pub request_id: RequestId,
    /// Id hash of the block as seen by the requester at submission.
    /// `None` only for a request refused before its target resolved.
    pub target_block_id: Option<BigUint>,
    pub target_height: u64,
    pub target_tx_index: usize,
    pub target_tx_id: Option<TxId>,
    pub kind: RedactionKind,
    /// Payload to install for MODIFY.
    pub replacement: Option<TxPayload>,
    pub requester: NodeId,
    pub policy_id: Option<String>,
    pub required_approvals: usize,
    pub approver_roles: BTreeSet<Role>,
    /// Distinct approvers in vote order.
    pub approvals: Vec<NodeId>,
    pub status: RedactionStatus,
    pub created_at: LogicalTime,
    pub time_lock_until: LogicalTime,
    pub expires_at: LogicalTime,
    pub requires_proof: bool,
    /// Justification supplied by the requester.
    pub reason: String,
    /// Why the request reached its terminal status.
    pub outcome: Option<String>,
}

/// Target coordinates and content of a new request.
#[derive(Clone, Debug)]
pub struct RequestTarget {
    pub block_id: BigUint,
    pub height: u64,
    pub tx_index: usize,
    pub tx_id: TxId,
}

impl RedactionRequest {
    /// Create a PENDING request under `decision`.
    ///
    /// `expires_at = created_at + time_lock + approval_window`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        request_id: RequestId,
        target: RequestTarget,
        kind: RedactionKind,
        replacement: Option<TxPayload>,
        requester: NodeId,
        reason: String,
        decision: PolicyDecision,
        now: LogicalTime,
        approval_window: LogicalTime,
    ) -> Self {
        let time_lock_until = now.saturating_add(decision.time_lock);
        Self {
            request_id,
            target_block_id: Some(target.block_id),
            target_height: target.height,
            target_tx_index: target.tx_index,
            target_tx_id: Some(target.tx_id),
            kind,
            replacement,
            requester,
            policy_id: decision.policy_id,
            required_approvals: decision.min_approvals,
            approver_roles: decision.approver_roles,
            approvals: Vec::new(),
            status: RedactionStatus::Pending,
            created_at: now,
            time_lock_until,
            expires_at: time_lock_until.saturating_add(approval_window),
            requires_proof: decision.requires_proof,
            reason,
            outcome: None,
        }
    }

    /// A request refused at submission, born REJECTED with `outcome`.
    ///
    /// Whatever part of the target the requester's chain resolves is kept
    /// for the audit trail.
    pub fn refused(
        request_id: RequestId,
        intent: &RedactionIntent,
        requester: NodeId,
        block: Option<&Block>,
        now: LogicalTime,
        outcome: String,
    ) -> Self {
        Self {
            request_id,
            target_block_id: block.map(|b| b.hash().clone()),
            target_height: intent.target_height,
            target_tx_index: intent.tx_index,
            target_tx_id: block.and_then(|b| b.transactions.get(intent.tx_index)).map(|tx| tx.id),
            kind: intent.kind,
            replacement: intent.replacement.as_deref().cloned(),
            requester,
            policy_id: None,
            required_approvals: 0,
            approver_roles: BTreeSet::new(),
            approvals: Vec::new(),
            status: RedactionStatus::Rejected,
            created_at: now,
            time_lock_until: now,
            expires_at: now,
            requires_proof: false,
            reason: intent.reason.clone(),
            outcome: Some(outcome),
        }
    }

    /// Whether `role` may vote on this request.
    pub fn accepts_role(&self, role: Role) -> bool {
        self.approver_roles.contains(&role)
    }

    pub fn has_approved(&self, node: NodeId) -> bool {
        self.approvals.contains(&node)
    }

    /// Apply lazy time- and count-based transitions.
    pub fn evaluate(&mut self, now: LogicalTime) -> RedactionStatus {
        if self.status == RedactionStatus::Pending {
            if self.approvals.len() >= self.required_approvals && now >= self.time_lock_until {
                self.status = RedactionStatus::QuorumReached;
            } else if now > self.expires_at {
                self.status = RedactionStatus::Expired;
                self.outcome = Some(format!(
                    "approval window closed with {} of {} approvals",
                    self.approvals.len(),
                    self.required_approvals
                ));
            }
        }
        self.status
    }

    /// Move to REJECTED with a reason.
    pub fn reject(&mut self, reason: impl Into<String>) {
        self.status = RedactionStatus::Rejected;
        self.outcome = Some(reason.into());
    }

    /// Move to EXECUTED.
    pub fn mark_executed(&mut self) {
        self.status = RedactionStatus::Executed;
        self.outcome = Some("executed".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(min_approvals: usize, time_lock: LogicalTime) -> RedactionRequest {
        RedactionRequest::new(
            RequestId(1),
            RequestTarget {
                block_id: BigUint::from(7u32),
                height: 5,
                tx_index: 2,
                tx_id: TxId(11),
            },
            RedactionKind::Delete,
            None,
            NodeId(0),
            "GDPR erasure".into(),
            PolicyDecision {
                policy_id: Some("GDPR_COMPLIANCE".into()),
                min_approvals,
                time_lock,
                requires_proof: false,
                approver_roles: [Role::Admin, Role::Regulator].into_iter().collect(),
            },
            1_000,
            500,
        )
    }

    #[test]
    fn test_deadlines() {
        let r = request(2, 300);
        assert_eq!(r.time_lock_until, 1_300);
        assert_eq!(r.expires_at, 1_800);
        assert_eq!(r.status, RedactionStatus::Pending);
    }

    #[test]
    fn test_quorum_waits_for_time_lock() {
        let mut r = request(2, 300);
        r.approvals = vec![NodeId(0), NodeId(1)];
        assert_eq!(r.evaluate(1_299), RedactionStatus::Pending);
        assert_eq!(r.evaluate(1_300), RedactionStatus::QuorumReached);
    }

    #[test]
    fn test_count_enforced() {
        let mut r = request(2, 0);
        r.approvals = vec![NodeId(0)];
        assert_eq!(r.evaluate(1_500), RedactionStatus::Pending);
    }

    #[test]
    fn test_expiry_without_quorum() {
        let mut r = request(2, 300);
        r.approvals = vec![NodeId(0)];
        assert_eq!(r.evaluate(1_800), RedactionStatus::Pending);
        assert_eq!(r.evaluate(1_801), RedactionStatus::Expired);
        assert!(r.status.is_terminal());
        assert!(r.outcome.as_deref().unwrap_or_default().contains("1 of 2"));
    }

    #[test]
    fn test_terminal_states_stick() {
        let mut r = request(1, 0);
        r.reject("forge failed");
        r.approvals = vec![NodeId(0)];
        assert_eq!(r.evaluate(1_001), RedactionStatus::Rejected);
    }

    #[test]
    fn test_refused_request_is_born_rejected() {
        let intent = RedactionIntent {
            target_height: 9,
            tx_index: 1,
            kind: RedactionKind::Modify,
            reason: "fraud".into(),
            replacement: None,
        };
        let mut r = RedactionRequest::refused(RequestId(4), &intent, NodeId(3), None, 2_000, "no policy".into());

        assert_eq!(r.status, RedactionStatus::Rejected);
        assert_eq!(r.outcome.as_deref(), Some("no policy"));
        assert_eq!(r.target_height, 9);
        assert!(r.target_block_id.is_none() && r.target_tx_id.is_none());
        assert_eq!(r.evaluate(2_001), RedactionStatus::Rejected);
    }
}
