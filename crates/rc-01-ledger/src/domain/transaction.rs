//! Transaction domain entities
//!
//! Transactions are immutable once included in a block. The only sanctioned
//! mutations are the redaction rewrites in this module (`with_payload`,
//! `anonymized`), applied by the redaction engine to a copy.

use serde::{Deserialize, Serialize};
use shared_crypto::Sha256Hasher;
use shared_types::{LogicalTime, NodeId, RedactionKind, TxId};
use std::collections::BTreeMap;
use std::fmt;

/// Transaction category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxKind {
    Transfer,
    ContractCall,
    ContractDeploy,
    RedactionRequest,
}

impl TxKind {
    fn tag(self) -> u8 {
        match self {
            TxKind::Transfer => 0,
            TxKind::ContractCall => 1,
            TxKind::ContractDeploy => 2,
            TxKind::RedactionRequest => 3,
        }
    }
}

/// Address of a deployed contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContractAddress(pub u64);

impl fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "contract-{:08x}", self.0)
    }
}

/// Invocation of a deployed contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCall {
    pub contract: ContractAddress,
    pub method: String,
    pub args: Vec<String>,
    pub gas_limit: u64,
}

/// Deployment of new contract code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractDeploy {
    pub code: String,
    pub gas_limit: u64,
}

/// On-chain request to redact a historical transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionIntent {
    pub target_height: u64,
    pub tx_index: usize,
    pub kind: RedactionKind,
    pub reason: String,
    /// Payload to install for MODIFY. `None` installs `TxPayload::Redacted`.
    pub replacement: Option<Box<TxPayload>>,
}

/// Closed set of transaction payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxPayload {
    Transfer { recipient: NodeId, amount: u64 },
    ContractCall(ContractCall),
    ContractDeploy(ContractDeploy),
    RedactionIntent(RedactionIntent),
    /// Sentinel left behind by a MODIFY redaction.
    Redacted,
}

impl TxPayload {
    fn digest_into(&self, hasher: &mut Sha256Hasher) {
        match self {
            TxPayload::Transfer { recipient, amount } => {
                hasher.update(&[0]).update_u64(recipient.0 as u64).update_u64(*amount);
            }
            TxPayload::ContractCall(call) => {
                hasher
                    .update(&[1])
                    .update_u64(call.contract.0)
                    .update_prefixed(call.method.as_bytes())
                    .update_u64(call.args.len() as u64);
                for arg in &call.args {
                    hasher.update_prefixed(arg.as_bytes());
                }
                hasher.update_u64(call.gas_limit);
            }
            TxPayload::ContractDeploy(deploy) => {
                hasher
                    .update(&[2])
                    .update_prefixed(deploy.code.as_bytes())
                    .update_u64(deploy.gas_limit);
            }
            TxPayload::RedactionIntent(intent) => {
                let kind = match intent.kind {
                    RedactionKind::Delete => 0u8,
                    RedactionKind::Modify => 1,
                    RedactionKind::Anonymize => 2,
                };
                hasher
                    .update(&[3])
                    .update_u64(intent.target_height)
                    .update_u64(intent.tx_index as u64)
                    .update(&[kind])
                    .update_prefixed(intent.reason.as_bytes());
                match &intent.replacement {
                    Some(payload) => {
                        hasher.update(&[1]);
                        payload.digest_into(hasher);
                    }
                    None => {
                        hasher.update(&[0]);
                    }
                }
            }
            TxPayload::Redacted => {
                hasher.update(&[4]);
            }
        }
    }
}

/// A transaction as included in a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TxId,
    pub kind: TxKind,
    pub payload: TxPayload,
    pub sender: NodeId,
    pub timestamp: LogicalTime,
}

impl Transaction {
    /// Value transfer between two nodes.
    pub fn transfer(id: TxId, sender: NodeId, recipient: NodeId, amount: u64, timestamp: LogicalTime) -> Self {
        Self {
            id,
            kind: TxKind::Transfer,
            payload: TxPayload::Transfer { recipient, amount },
            sender,
            timestamp,
        }
    }

    /// Contract invocation.
    pub fn contract_call(id: TxId, sender: NodeId, call: ContractCall, timestamp: LogicalTime) -> Self {
        Self {
            id,
            kind: TxKind::ContractCall,
            payload: TxPayload::ContractCall(call),
            sender,
            timestamp,
        }
    }

    /// Contract deployment.
    pub fn contract_deploy(id: TxId, sender: NodeId, deploy: ContractDeploy, timestamp: LogicalTime) -> Self {
        Self {
            id,
            kind: TxKind::ContractDeploy,
            payload: TxPayload::ContractDeploy(deploy),
            sender,
            timestamp,
        }
    }

    /// Redaction request carried on chain.
    pub fn redaction_request(id: TxId, sender: NodeId, intent: RedactionIntent, timestamp: LogicalTime) -> Self {
        Self {
            id,
            kind: TxKind::RedactionRequest,
            payload: TxPayload::RedactionIntent(intent),
            sender,
            timestamp,
        }
    }

    /// Copy with the payload replaced (MODIFY).
    pub fn with_payload(&self, payload: TxPayload) -> Self {
        Self {
            payload,
            ..self.clone()
        }
    }

    /// Copy with identifying fields overwritten (ANONYMIZE).
    ///
    /// Sender and transfer recipient become `NodeId::ANONYMOUS`; contract
    /// call arguments are cleared. Deploy, redaction-intent and already
    /// redacted payloads carry no participant fields and are kept as they
    /// are, so only the sender changes.
    pub fn anonymized(&self) -> Self {
        let payload = match &self.payload {
            TxPayload::Transfer { amount, .. } => TxPayload::Transfer {
                recipient: NodeId::ANONYMOUS,
                amount: *amount,
            },
            TxPayload::ContractCall(call) => TxPayload::ContractCall(ContractCall {
                args: Vec::new(),
                ..call.clone()
            }),
            other => other.clone(),
        };
        Self {
            sender: NodeId::ANONYMOUS,
            payload,
            ..self.clone()
        }
    }

    /// Whether the payload has been replaced by the redaction sentinel.
    pub fn is_redacted(&self) -> bool {
        matches!(self.payload, TxPayload::Redacted)
    }

    /// Canonical field-by-field digest input.
    pub fn digest_into(&self, hasher: &mut Sha256Hasher) {
        hasher
            .update_u64(self.id.0)
            .update(&[self.kind.tag()])
            .update_u64(self.sender.0 as u64)
            .update_u64(self.timestamp);
        self.payload.digest_into(hasher);
    }
}

/// State change reported by the contract executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDelta {
    pub contract: ContractAddress,
    pub gas_used: u64,
    pub writes: BTreeMap<String, String>,
}

/// Execution outcome stored alongside a contract transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReceipt {
    pub tx_id: TxId,
    pub delta: StateDelta,
}
