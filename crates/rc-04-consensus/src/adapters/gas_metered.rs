//! Gas-metered contract executor
//!
//! Simulation adapter for `ContractExecutor`. Contracts have no real
//! semantics: a call costs
//!
//! ```text
//! 21000 + 100 × len(method) + 200 × number of args
//! ```
//!
//! and writes its argument list under the method name in the contract's
//! storage.

use crate::domain::ExecutionError;
use crate::ports::ContractExecutor;
use rc_01_ledger::{ContractAddress, ContractCall, ContractDeploy, StateDelta};
use shared_crypto::Sha256Hasher;
use shared_types::TxId;
use std::collections::BTreeMap;
use tracing::debug;

/// Base cost of any contract transaction.
pub const BASE_GAS: u64 = 21_000;

/// Cost per byte of method name.
pub const METHOD_BYTE_GAS: u64 = 100;

/// Cost per argument.
pub const ARG_GAS: u64 = 200;

/// Fixed address of the built-in redaction audit contract.
pub const REDACTION_AUDIT_CONTRACT: ContractAddress = ContractAddress(1);

/// Fixed address of the built-in data privacy contract.
pub const DATA_PRIVACY_CONTRACT: ContractAddress = ContractAddress(2);

#[derive(Clone, Debug)]
struct DeployedContract {
    code: String,
    storage: BTreeMap<String, String>,
}

/// In-memory executor with deterministic gas accounting.
#[derive(Clone, Debug, Default)]
pub struct GasMeteredExecutor {
    contracts: BTreeMap<ContractAddress, DeployedContract>,
}

impl GasMeteredExecutor {
    /// Executor with no contracts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Executor preloaded with the redaction audit and data privacy contracts.
    pub fn with_builtin_contracts() -> Self {
        let mut executor = Self::new();
        executor.register(REDACTION_AUDIT_CONTRACT, "contract RedactionAudit");
        executor.register(DATA_PRIVACY_CONTRACT, "contract DataPrivacy");
        executor
    }

    /// Gas charged for `call`.
    pub fn gas_cost(call: &ContractCall) -> u64 {
        BASE_GAS + METHOD_BYTE_GAS * call.method.len() as u64 + ARG_GAS * call.args.len() as u64
    }

    /// Current storage value of a deployed contract.
    pub fn storage(&self, contract: ContractAddress, key: &str) -> Option<&str> {
        self.contracts
            .get(&contract)
            .and_then(|c| c.storage.get(key))
            .map(String::as_str)
    }

    /// Code of a deployed contract.
    pub fn code(&self, contract: ContractAddress) -> Option<&str> {
        self.contracts.get(&contract).map(|c| c.code.as_str())
    }

    fn register(&mut self, address: ContractAddress, code: &str) {
        self.contracts.insert(
            address,
            DeployedContract {
                code: code.to_string(),
                storage: BTreeMap::new(),
            },
        );
    }

    fn derive_address(deploy: &ContractDeploy, tx_id: TxId) -> ContractAddress {
        let mut hasher = Sha256Hasher::new();
        hasher.update_u64(tx_id.0).update_prefixed(deploy.code.as_bytes());
        let digest = hasher.finalize();
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        ContractAddress(u64::from_be_bytes(prefix))
    }
}

impl ContractExecutor for GasMeteredExecutor {
    fn execute(&mut self, call: &ContractCall) -> Result<StateDelta, ExecutionError> {
        let contract = self
            .contracts
            .get_mut(&call.contract)
            .ok_or(ExecutionError::UnknownContract(call.contract))?;

        let required = Self::gas_cost(call);
        if required > call.gas_limit {
            return Err(ExecutionError::OutOfGas {
                required,
                limit: call.gas_limit,
            });
        }

        let value = call.args.join(",");
        contract.storage.insert(call.method.clone(), value.clone());

        let mut writes = BTreeMap::new();
        writes.insert(call.method.clone(), value);
        debug!(contract = %call.contract, method = %call.method, gas = required, "Executed contract call");
        Ok(StateDelta {
            contract: call.contract,
            gas_used: required,
            writes,
        })
    }

    fn deploy(&mut self, deploy: &ContractDeploy, tx_id: TxId) -> Result<StateDelta, ExecutionError> {
        if BASE_GAS > deploy.gas_limit {
            return Err(ExecutionError::OutOfGas {
                required: BASE_GAS,
                limit: deploy.gas_limit,
            });
        }
        let address = Self::derive_address(deploy, tx_id);
        self.register(address, &deploy.code);
        debug!(contract = %address, "Deployed contract");
        Ok(StateDelta {
            contract: address,
            gas_used: BASE_GAS,
            writes: BTreeMap::new(),
        })
    }

    fn deployed_contracts(&self) -> Vec<ContractAddress> {
        self.contracts.keys().copied().collect()
    }
}
