//! Driven ports (Outbound dependencies)

use crate::domain::ExecutionError;
use rc_01_ledger::{ContractAddress, ContractCall, ContractDeploy, StateDelta};
use shared_types::TxId;

/// Smart-contract execution used during block assembly.
///
/// The consensus service treats execution as opaque: it records the returned
/// `StateDelta` as a receipt and logs failures.
pub trait ContractExecutor {
    /// Execute a call against a deployed contract.
    fn execute(&mut self, call: &ContractCall) -> Result<StateDelta, ExecutionError>;

    /// Deploy new contract code. The delta names the assigned address.
    fn deploy(&mut self, deploy: &ContractDeploy, tx_id: TxId) -> Result<StateDelta, ExecutionError>;

    /// Addresses currently callable.
    fn deployed_contracts(&self) -> Vec<ContractAddress>;
}
