//! Redaction Engine - Core business logic
//!
//! # Responsibilities
//! - Admit requests under the policy book
//! - Collect votes from role-eligible nodes
//! - Evaluate quorum, time locks and expiry lazily
//! - Forge a collision with the trapdoor and rewrite the target block in place
//! - Archive every request that reaches a terminal status
//!
//! # Trapdoor custody
//!
//! With a central authority, the authority node executes every redaction on
//! its own chain. With threshold custody, the lowest-id share holder
//! executes, using the shares of the approving share-holders; the
//! reconstructed key lives only for the single forge call.
//!
//! A forge that does not reproduce the block id surfaces as the ledger's
//! fatal `ConsistencyViolation`.

use crate::domain::{
    redacted_transactions, PolicyBook, RedactionError, RedactionRequest, RedactionResult, RedactionStatus,
    RequestTarget,
};
use crate::ports::ProofSystem;
use rc_01_ledger::{compute_message, Block, RedactionIntent, RedactionRecord};
use rc_02_node::Node;
use shared_crypto::{ChameleonHash, TrapdoorHolder};
use shared_types::{LogicalTime, NodeId, RequestId};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Where the trapdoor lives.
#[derive(Debug, Clone)]
pub enum TrapdoorCustody {
    /// One node holds the full key.
    Central { authority: NodeId, holder: TrapdoorHolder },
    /// `holders` each hold one Shamir share; `threshold` reconstruct.
    Threshold { threshold: usize, holders: Vec<NodeId> },
}

/// Dependencies for RedactionEngine
pub struct RedactionDependencies {
    pub policies: PolicyBook,
    pub approval_window: LogicalTime,
    pub hasher: ChameleonHash,
    pub custody: TrapdoorCustody,
    /// Required only by policies with `requires_proof`.
    pub proof_system: Option<Box<dyn ProofSystem>>,
}

/// Redaction Engine
pub struct RedactionEngine {
    policies: PolicyBook,
    approval_window: LogicalTime,
    hasher: ChameleonHash,
    custody: TrapdoorCustody,
    proof_system: Option<Box<dyn ProofSystem>>,
    next_id: u64,
    active: BTreeMap<RequestId, RedactionRequest>,
    archive: Vec<RedactionRequest>,
}

impl RedactionEngine {
    /// Create a new RedactionEngine
    pub fn new(deps: RedactionDependencies) -> Self {
        Self {
            policies: deps.policies,
            approval_window: deps.approval_window,
            hasher: deps.hasher,
            custody: deps.custody,
            proof_system: deps.proof_system,
            next_id: 1,
            active: BTreeMap::new(),
            archive: Vec::new(),
        }
    }

    pub fn policies(&self) -> &PolicyBook {
        &self.policies
    }

    pub fn custody(&self) -> &TrapdoorCustody {
        &self.custody
    }

    // === SUBMISSION ===

    /// Open a request from `requester` against a block on its own chain.
    ///
    /// A refused request still gets an id and is archived as REJECTED with
    /// the refusal reason.
    ///
    /// # Errors
    ///
    /// - `PolicyViolation` if the requester's role may not request the kind
    /// - `TargetNotFound` if the requester has no block at the target height
    /// - `TargetNotRedactable` for the genesis block
    /// - `TxIndexOutOfRange` if the block has no such transaction
    pub fn submit(
        &mut self,
        requester: &Node,
        intent: &RedactionIntent,
        now: LogicalTime,
    ) -> RedactionResult<RequestId> {
        let request_id = RequestId(self.next_id);
        self.next_id += 1;

        match self.admit(request_id, requester, intent, now) {
            Ok(request) => {
                info!(
                    request = %request_id,
                    requester = %requester.id(),
                    kind = %intent.kind,
                    height = intent.target_height,
                    tx_index = intent.tx_index,
                    policy = request.policy_id.as_deref().unwrap_or("capability-table"),
                    required = request.required_approvals,
                    "Redaction requested"
                );
                self.active.insert(request_id, request);
                Ok(request_id)
            }
            Err(e) => {
                warn!(request = %request_id, requester = %requester.id(), error = %e, "Redaction request refused");
                let block = requester.chain().get_by_height(intent.target_height);
                self.archive.push(RedactionRequest::refused(
                    request_id,
                    intent,
                    requester.id(),
                    block,
                    now,
                    e.to_string(),
                ));
                Err(e)
            }
        }
    }

    fn admit(
        &self,
        request_id: RequestId,
        requester: &Node,
        intent: &RedactionIntent,
        now: LogicalTime,
    ) -> RedactionResult<RedactionRequest> {
        let decision = self.policies.check_redaction_policy(intent.kind, requester.role())?;

        let block = requester
            .chain()
            .get_by_height(intent.target_height)
            .ok_or(RedactionError::TargetNotFound(intent.target_height))?;
        if block.is_genesis() {
            return Err(RedactionError::TargetNotRedactable("genesis block".into()));
        }
        let tx = block.transactions.get(intent.tx_index).ok_or(RedactionError::TxIndexOutOfRange {
            index: intent.tx_index,
            len: block.transactions.len(),
        })?;

        Ok(RedactionRequest::new(
            request_id,
            RequestTarget {
                block_id: block.hash().clone(),
                height: block.height,
                tx_index: intent.tx_index,
                tx_id: tx.id,
            },
            intent.kind,
            intent.replacement.as_deref().cloned(),
            requester.id(),
            intent.reason.clone(),
            decision,
            now,
            self.approval_window,
        ))
    }

    // === VOTING ===

    /// Record an approval from `voter`.
    ///
    /// # Errors
    ///
    /// - `UnknownRequest` / `RequestClosed` if the request is not open
    /// - `IneligibleApprover` for a role outside the approver set or a repeat vote
    pub fn approve(&mut self, request_id: RequestId, voter: &Node, now: LogicalTime) -> RedactionResult<RedactionStatus> {
        let status = self.evaluate(request_id, now)?;
        if status.is_terminal() {
            return Err(RedactionError::RequestClosed {
                request: request_id,
                status,
            });
        }
        let request = self
            .active
            .get_mut(&request_id)
            .ok_or(RedactionError::UnknownRequest(request_id))?;

        if !request.accepts_role(voter.role()) {
            return Err(RedactionError::IneligibleApprover {
                node: voter.id(),
                reason: format!("role {} may not approve this request", voter.role()),
            });
        }
        if request.has_approved(voter.id()) {
            return Err(RedactionError::IneligibleApprover {
                node: voter.id(),
                reason: "already approved".into(),
            });
        }

        request.approvals.push(voter.id());
        let status = request.evaluate(now);
        debug!(
            request = %request_id,
            voter = %voter.id(),
            approvals = request.approvals.len(),
            required = request.required_approvals,
            status = %status,
            "Approval recorded"
        );
        Ok(status)
    }

    /// Nodes that could still cast a counted vote on the request.
    pub fn eligible_voters(&self, request_id: RequestId, nodes: &[Node]) -> Vec<NodeId> {
        let Some(request) = self.active.get(&request_id) else {
            return Vec::new();
        };
        nodes
            .iter()
            .filter(|n| request.accepts_role(n.role()) && !request.has_approved(n.id()))
            .map(Node::id)
            .collect()
    }

    // === EVALUATION ===

    /// Re-evaluate one request, archiving it if it became terminal.
    pub fn evaluate(&mut self, request_id: RequestId, now: LogicalTime) -> RedactionResult<RedactionStatus> {
        let Some(request) = self.active.get_mut(&request_id) else {
            return match self.archive.iter().find(|r| r.request_id == request_id) {
                Some(archived) => Ok(archived.status),
                None => Err(RedactionError::UnknownRequest(request_id)),
            };
        };
        let status = request.evaluate(now);
        if status.is_terminal() {
            self.archive_request(request_id);
        }
        Ok(status)
    }

    /// Evaluate every open request; returns those ready for execution.
    pub fn poll(&mut self, now: LogicalTime) -> Vec<RequestId> {
        let ids: Vec<RequestId> = self.active.keys().copied().collect();
        ids.into_iter()
            .filter(|id| matches!(self.evaluate(*id, now), Ok(RedactionStatus::QuorumReached)))
            .collect()
    }

    // === EXECUTION ===

    /// Node that performs the forge for a request.
    ///
    /// Every redaction is forged on one chain: the authority's, or under
    /// threshold custody the lowest-id share holder's. Successive forges
    /// on a block therefore always build on the previous one.
    pub fn executor_for(&self, request: &RedactionRequest) -> NodeId {
        match &self.custody {
            TrapdoorCustody::Central { authority, .. } => *authority,
            TrapdoorCustody::Threshold { holders, .. } => holders.iter().min().copied().unwrap_or(request.requester),
        }
    }

    /// Execute a QUORUM_REACHED request on the executor's chain.
    ///
    /// Returns a copy of the redacted block for propagation. Any failure
    /// rejects the request; it is never retried.
    ///
    /// # Errors
    ///
    /// - `NotReady` / `RequestClosed` if the request has not reached quorum
    /// - `RedactionFailed` if the trapdoor, the target or the proof is unusable
    /// - `Ledger` if the executor's chain breaks (fatal)
    pub fn execute_redaction(
        &mut self,
        request_id: RequestId,
        nodes: &mut [Node],
        now: LogicalTime,
    ) -> RedactionResult<Block> {
        let status = self.evaluate(request_id, now)?;
        match status {
            RedactionStatus::QuorumReached => {}
            s if s.is_terminal() => {
                return Err(RedactionError::RequestClosed {
                    request: request_id,
                    status: s,
                })
            }
            s => {
                return Err(RedactionError::NotReady {
                    request: request_id,
                    status: s,
                })
            }
        }
        let request = self
            .active
            .get(&request_id)
            .cloned()
            .ok_or(RedactionError::UnknownRequest(request_id))?;

        match self.forge_and_apply(&request, nodes, now) {
            Ok(block) => {
                if let Some(active) = self.active.get_mut(&request_id) {
                    active.mark_executed();
                }
                self.archive_request(request_id);
                info!(
                    request = %request_id,
                    kind = %request.kind,
                    height = block.height,
                    id = %block.id,
                    approvers = request.approvals.len(),
                    "Redaction executed"
                );
                Ok(block)
            }
            Err(e) => {
                if let Some(active) = self.active.get_mut(&request_id) {
                    active.reject(e.to_string());
                }
                self.archive_request(request_id);
                warn!(request = %request_id, error = %e, "Redaction rejected");
                Err(e)
            }
        }
    }

    fn forge_and_apply(
        &self,
        request: &RedactionRequest,
        nodes: &mut [Node],
        now: LogicalTime,
    ) -> RedactionResult<Block> {
        let executor = self.executor_for(request);
        let holder = self.collect_trapdoor(request, nodes);
        let node = nodes
            .iter_mut()
            .find(|n| n.id() == executor)
            .ok_or_else(|| RedactionError::RedactionFailed(format!("executor {executor} is not in the network")))?;

        let block = node
            .chain()
            .get_by_height(request.target_height)
            .ok_or(RedactionError::TargetNotFound(request.target_height))?;
        if Some(block.hash()) != request.target_block_id.as_ref() {
            return Err(RedactionError::RedactionFailed(format!(
                "block at height {} on {} is not the requested target",
                request.target_height, executor
            )));
        }
        // Earlier redactions of the same block may have shifted the index
        let tx_id = request
            .target_tx_id
            .ok_or_else(|| RedactionError::RedactionFailed("request has no target transaction".into()))?;
        let tx_index = block
            .transactions
            .iter()
            .position(|tx| tx.id == tx_id)
            .ok_or_else(|| RedactionError::RedactionFailed(format!("transaction {tx_id} is no longer in the block")))?;

        let transactions = redacted_transactions(block, tx_index, request.kind, request.replacement.as_ref())?;
        let m_old = block.message(&self.hasher);
        let m_new = compute_message(&self.hasher, &block.previous_id, &transactions);
        let randomness = holder
            .forge(&self.hasher, &m_old, &block.id.randomness, &m_new)
            .map_err(|e| RedactionError::RedactionFailed(e.to_string()))?;

        let mut redacted = block.clone();
        redacted.apply_redaction(&self.hasher, transactions, randomness)?;
        redacted.record_redaction(RedactionRecord {
            request_id: request.request_id,
            kind: request.kind,
            tx_index,
            tx_id,
            requester: request.requester,
            approvers: request.approvals.clone(),
            timestamp: now,
        });

        if request.requires_proof {
            let proof_system = self.proof_system.as_ref().ok_or_else(|| {
                RedactionError::RedactionFailed("policy requires a proof but no proof system is configured".into())
            })?;
            let proof = proof_system.generate_consistency_proof(block, &redacted, request.kind);
            if !proof_system.verify(&proof) {
                return Err(RedactionError::RedactionFailed("consistency proof rejected".into()));
            }
        }

        if !node.chain_mut().replace_redacted(redacted.clone()) {
            return Err(RedactionError::RedactionFailed(format!(
                "{} could not install the redacted block",
                executor
            )));
        }
        Ok(redacted)
    }

    fn collect_trapdoor(&self, request: &RedactionRequest, nodes: &[Node]) -> TrapdoorHolder {
        match &self.custody {
            TrapdoorCustody::Central { holder, .. } => holder.clone(),
            TrapdoorCustody::Threshold { threshold, holders } => {
                let mut collected = TrapdoorHolder::collecting(*threshold);
                for approver in request.approvals.iter().filter(|a| holders.contains(a)) {
                    if let Some(share) = nodes.iter().find(|n| n.id() == *approver).and_then(Node::key_share) {
                        collected.add_share(share);
                    }
                }
                collected
            }
        }
    }

    fn archive_request(&mut self, request_id: RequestId) {
        if let Some(request) = self.active.remove(&request_id) {
            if request.status == RedactionStatus::Expired {
                info!(request = %request_id, approvals = request.approvals.len(), "Redaction request expired");
            }
            self.archive.push(request);
        }
    }

    // === QUERIES ===

    /// Open or archived request by id.
    pub fn request(&self, request_id: RequestId) -> Option<&RedactionRequest> {
        self.active
            .get(&request_id)
            .or_else(|| self.archive.iter().find(|r| r.request_id == request_id))
    }

    pub fn active(&self) -> impl Iterator<Item = &RedactionRequest> {
        self.active.values()
    }

    pub fn archived(&self) -> &[RedactionRequest] {
        &self.archive
    }

    /// Request count per status over open and archived requests.
    pub fn status_counts(&self) -> BTreeMap<RedactionStatus, usize> {
        let mut counts = BTreeMap::new();
        for request in self.active.values().chain(self.archive.iter()) {
            *counts.entry(request.status).or_insert(0) += 1;
        }
        counts
    }
}
