//! # Simulation Configuration
//!
//! Static, read-only input supplied at startup. Every subsystem receives the
//! part it needs by reference; nothing mutates the configuration after
//! `validate()` has accepted it.
//!
//! Time values are logical ticks (one tick = one simulated millisecond).

use crate::entities::{LogicalTime, NodeId, RedactionKind, Role};
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Complete simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for the scheduler RNG. Same seed + same nodes = same trace.
    pub seed: u64,
    /// Node roster. A node's id is its index in this list.
    pub nodes: Vec<NodeSpec>,
    /// Logical time between consecutive mining lotteries.
    pub block_interval: LogicalTime,
    /// Mean block propagation delay between two nodes.
    pub mean_propagation_delay: LogicalTime,
    /// Events scheduled after this time are not processed.
    pub end_time: LogicalTime,
    /// Transaction generation settings.
    pub workload: WorkloadConfig,
    /// Fork choice and orphan handling.
    pub consensus: ConsensusSettings,
    /// Redaction governance.
    pub redaction: RedactionConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            nodes: vec![
                NodeSpec::new(Role::Admin, 0.30),
                NodeSpec::new(Role::Regulator, 0.20),
                NodeSpec::new(Role::Miner, 0.25),
                NodeSpec::new(Role::Miner, 0.25),
                NodeSpec::new(Role::User, 0.0),
                NodeSpec::new(Role::Observer, 0.0),
            ],
            block_interval: 300_000,      // 5 minutes
            mean_propagation_delay: 420,  // 0.42 seconds
            end_time: 10_000_000,         // ~2.8 hours
            workload: WorkloadConfig::default(),
            consensus: ConsensusSettings::default(),
            redaction: RedactionConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Node ids in roster order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| NodeId(i as u32))
    }

    /// Look up a node spec by id.
    pub fn node(&self, id: NodeId) -> Option<&NodeSpec> {
        self.nodes.get(id.0 as usize)
    }

    /// Validate the configuration before the simulation starts.
    ///
    /// # Returns
    ///
    /// Returns `Err` if:
    /// - the roster is empty or no node has a positive hash share
    /// - a hash share is negative or not finite
    /// - the block interval is zero
    /// - a probability or ratio lies outside `[0, 1]`
    /// - the trapdoor or a scheduled redaction names an unknown node
    /// - a threshold is zero or exceeds its holder count
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nodes.is_empty() {
            return Err(ConfigError::EmptyRoster);
        }
        for (index, spec) in self.nodes.iter().enumerate() {
            if !spec.hash_rate_share.is_finite() || spec.hash_rate_share < 0.0 {
                return Err(ConfigError::InvalidHashShare {
                    node: NodeId(index as u32),
                    share: spec.hash_rate_share,
                });
            }
        }
        if self.nodes.iter().all(|spec| spec.hash_rate_share == 0.0) {
            return Err(ConfigError::NoMiners);
        }
        if self.block_interval == 0 {
            return Err(ConfigError::ZeroBlockInterval);
        }
        self.workload.validate()?;
        self.redaction.validate(self.nodes.len())?;
        Ok(())
    }
}

/// Static description of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Permissioned role.
    pub role: Role,
    /// Relative mining power. Shares need not sum to one.
    pub hash_rate_share: f64,
}

impl NodeSpec {
    /// Create a node spec.
    pub fn new(role: Role, hash_rate_share: f64) -> Self {
        Self {
            role,
            hash_rate_share,
        }
    }
}

/// Transaction workload generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadConfig {
    /// Transactions packed into every mined block.
    pub txs_per_block: usize,
    /// Fraction of generated transactions that are contract calls.
    pub contract_call_ratio: f64,
    /// Fraction of generated transactions that deploy contracts.
    pub contract_deploy_ratio: f64,
    /// Fraction of generated transactions that request a redaction.
    pub redaction_request_ratio: f64,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            txs_per_block: 8,
            contract_call_ratio: 0.10,
            contract_deploy_ratio: 0.05,
            redaction_request_ratio: 0.05,
        }
    }
}

impl WorkloadConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let ratios = [
            ("contract_call_ratio", self.contract_call_ratio),
            ("contract_deploy_ratio", self.contract_deploy_ratio),
            ("redaction_request_ratio", self.redaction_request_ratio),
        ];
        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange { field: name, value });
            }
        }
        let total = self.contract_call_ratio + self.contract_deploy_ratio + self.redaction_request_ratio;
        if total > 1.0 {
            return Err(ConfigError::OutOfRange {
                field: "workload ratio sum",
                value: total,
            });
        }
        Ok(())
    }
}

/// Rule used to compare competing branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ForkChoiceRule {
    /// Most blocks wins.
    #[default]
    LongestChain,
    /// Highest cumulative declared difficulty wins.
    HeaviestChain,
}

/// Consensus settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusSettings {
    /// Branch comparison rule.
    pub fork_choice: ForkChoiceRule,
    /// Ticks an orphan block is buffered before it is dropped.
    pub orphan_timeout: LogicalTime,
    /// Declared difficulty written into every mined block.
    pub difficulty: u64,
}

impl Default for ConsensusSettings {
    fn default() -> Self {
        Self {
            fork_choice: ForkChoiceRule::LongestChain,
            orphan_timeout: 600_000,
            difficulty: 1,
        }
    }
}

/// Redaction policy bound to one redaction kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionPolicy {
    /// Human-readable policy name (e.g. `GDPR_COMPLIANCE`).
    pub policy_id: String,
    /// Redaction kind this policy governs.
    pub kind: RedactionKind,
    /// Roles allowed to request and approve under this policy.
    pub authorized_roles: BTreeSet<Role>,
    /// Distinct approvals needed for quorum.
    pub min_approvals: usize,
    /// Ticks after creation before the request may execute.
    pub time_lock: LogicalTime,
    /// Whether execution requires a verified consistency proof.
    #[serde(default)]
    pub requires_proof: bool,
}

impl RedactionPolicy {
    /// Create a policy without a proof requirement.
    pub fn new(
        policy_id: impl Into<String>,
        kind: RedactionKind,
        authorized_roles: impl IntoIterator<Item = Role>,
        min_approvals: usize,
        time_lock: LogicalTime,
    ) -> Self {
        Self {
            policy_id: policy_id.into(),
            kind,
            authorized_roles: authorized_roles.into_iter().collect(),
            min_approvals,
            time_lock,
            requires_proof: false,
        }
    }

    /// Require a verified consistency proof before execution.
    pub fn with_proof(mut self) -> Self {
        self.requires_proof = true;
        self
    }
}

/// Who holds the chameleon trapdoor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TrapdoorConfig {
    /// One node holds the whole secret key and performs every redaction.
    CentralAuthority {
        /// The trapdoor-holding node.
        authority: NodeId,
    },
    /// The key is Shamir-shared; `threshold` shares from approvers are needed.
    Threshold {
        /// Shares required to reconstruct the key.
        threshold: usize,
        /// Nodes that receive a share, in share-index order.
        holders: Vec<NodeId>,
    },
}

impl Default for TrapdoorConfig {
    fn default() -> Self {
        Self::CentralAuthority {
            authority: NodeId(0),
        }
    }
}

/// A redaction request injected from outside the chain at a fixed time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledRedaction {
    /// When the request is submitted.
    pub at: LogicalTime,
    /// Requesting node.
    pub requester: NodeId,
    /// Height of the block to redact on the requester's chain.
    pub target_height: u64,
    /// Index of the transaction within the block.
    pub tx_index: usize,
    /// Operation to perform.
    pub kind: RedactionKind,
    /// Free-form justification.
    #[serde(default)]
    pub reason: String,
}

/// Redaction governance settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedactionConfig {
    /// Master switch for the redaction subsystem.
    pub enabled: bool,
    /// Policies, matched in order.
    pub policies: Vec<RedactionPolicy>,
    /// Approvals required when no policy covers a kind.
    pub default_min_approvals: usize,
    /// Ticks after the time lock during which quorum may still be reached.
    pub approval_window: LogicalTime,
    /// Interval between `RedactionTick` events.
    pub tick_interval: LogicalTime,
    /// Probability that an eligible node approves when it votes.
    pub approval_probability: f64,
    /// Trapdoor custody.
    pub trapdoor: TrapdoorConfig,
    /// Externally submitted requests.
    pub scheduled: Vec<ScheduledRedaction>,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            policies: vec![
                RedactionPolicy::new(
                    "GDPR_COMPLIANCE",
                    RedactionKind::Delete,
                    [Role::Admin, Role::Regulator],
                    2,
                    300_000,
                ),
                RedactionPolicy::new(
                    "AUDIT_REQUIREMENT",
                    RedactionKind::Anonymize,
                    [Role::Admin, Role::Regulator],
                    2,
                    600_000,
                ),
                RedactionPolicy::new("SECURITY_INCIDENT", RedactionKind::Modify, [Role::Admin], 1, 0),
                RedactionPolicy::new(
                    "DATA_CORRECTION",
                    RedactionKind::Modify,
                    [Role::Admin, Role::Regulator, Role::User],
                    3,
                    1_800_000,
                ),
            ],
            default_min_approvals: 2,
            approval_window: 3_600_000,
            tick_interval: 60_000,
            approval_probability: 0.7,
            trapdoor: TrapdoorConfig::default(),
            scheduled: Vec::new(),
        }
    }
}

impl RedactionConfig {
    fn validate(&self, node_count: usize) -> Result<(), ConfigError> {
        let known = |id: &NodeId| (id.0 as usize) < node_count;

        if !(0.0..=1.0).contains(&self.approval_probability) {
            return Err(ConfigError::OutOfRange {
                field: "approval_probability",
                value: self.approval_probability,
            });
        }
        if self.enabled && self.tick_interval == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        match &self.trapdoor {
            TrapdoorConfig::CentralAuthority { authority } => {
                if !known(authority) {
                    return Err(ConfigError::UnknownNode(*authority));
                }
            }
            TrapdoorConfig::Threshold { threshold, holders } => {
                if let Some(unknown) = holders.iter().find(|id| !known(id)) {
                    return Err(ConfigError::UnknownNode(*unknown));
                }
                let distinct: HashSet<_> = holders.iter().collect();
                if distinct.len() != holders.len() {
                    return Err(ConfigError::DuplicateShareHolder);
                }
                if *threshold == 0 || *threshold > holders.len() {
                    return Err(ConfigError::InvalidThreshold {
                        threshold: *threshold,
                        holders: holders.len(),
                    });
                }
            }
        }
        for policy in &self.policies {
            if policy.min_approvals == 0 {
                return Err(ConfigError::ZeroApprovals(policy.policy_id.clone()));
            }
        }
        if let Some(bad) = self.scheduled.iter().find(|s| !known(&s.requester)) {
            return Err(ConfigError::UnknownNode(bad.requester));
        }
        Ok(())
    }
}
