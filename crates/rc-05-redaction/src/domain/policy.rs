//! Redaction policy book
//!
//! Policies are matched by redaction kind in configuration order. Among the
//! policies for a kind, the first one that authorizes the requester's role
//! governs the request. Kinds without any policy fall back to the role
//! capability table and the global default quorum.

use super::error::{RedactionError, RedactionResult};
use shared_types::{LogicalTime, RedactionKind, RedactionPolicy, Role};
use std::collections::BTreeSet;

/// Rules that govern one request, fixed at submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicyDecision {
    /// Governing policy, or `None` for the capability-table fallback.
    pub policy_id: Option<String>,
    pub min_approvals: usize,
    pub time_lock: LogicalTime,
    pub requires_proof: bool,
    /// Roles whose votes count.
    pub approver_roles: BTreeSet<Role>,
}

/// Configured policies plus fallback quorum.
#[derive(Clone, Debug)]
pub struct PolicyBook {
    policies: Vec<RedactionPolicy>,
    default_min_approvals: usize,
}

impl PolicyBook {
    pub fn new(policies: Vec<RedactionPolicy>, default_min_approvals: usize) -> Self {
        Self {
            policies,
            default_min_approvals,
        }
    }

    pub fn policies(&self) -> &[RedactionPolicy] {
        &self.policies
    }

    /// Decide whether `role` may request `kind`, and under which rules.
    ///
    /// # Errors
    ///
    /// `PolicyViolation` if policies exist for `kind` but none lists `role`,
    /// or if no policy exists and the capability table denies `role`.
    pub fn check_redaction_policy(&self, kind: RedactionKind, role: Role) -> RedactionResult<PolicyDecision> {
        let mut matching = self.policies.iter().filter(|p| p.kind == kind).peekable();

        if matching.peek().is_none() {
            if !role.may_request(kind) {
                return Err(RedactionError::PolicyViolation(format!(
                    "role {role} may not request {kind}"
                )));
            }
            let approver_roles = Role::ALL.into_iter().filter(Role::may_approve).collect();
            return Ok(PolicyDecision {
                policy_id: None,
                min_approvals: self.default_min_approvals,
                time_lock: 0,
                requires_proof: false,
                approver_roles,
            });
        }

        matching
            .find(|p| p.authorized_roles.contains(&role))
            .map(|p| PolicyDecision {
                policy_id: Some(p.policy_id.clone()),
                min_approvals: p.min_approvals,
                time_lock: p.time_lock,
                requires_proof: p.requires_proof,
                approver_roles: p.authorized_roles.clone(),
            })
            .ok_or_else(|| {
                RedactionError::PolicyViolation(format!("no {kind} policy authorizes role {role}"))
            })
    }
}
