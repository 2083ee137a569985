//! Redaction operations
//!
//! Builds the rewritten transaction list for a block. The block itself is
//! never touched here.

use super::error::{RedactionError, RedactionResult};
use rc_01_ledger::{Block, Transaction, TxPayload};
use shared_types::RedactionKind;

/// Rewritten transaction list for `kind` applied at `tx_index`.
///
/// - DELETE removes the transaction (its receipt is dropped by
///   `Block::apply_redaction`)
/// - MODIFY installs `replacement`, or `TxPayload::Redacted` if none
/// - ANONYMIZE overwrites sender/recipient and clears contract arguments
///
/// # Errors
///
/// `TxIndexOutOfRange` if the block has no transaction at `tx_index`.
pub fn redacted_transactions(
    block: &Block,
    tx_index: usize,
    kind: RedactionKind,
    replacement: Option<&TxPayload>,
) -> RedactionResult<Vec<Transaction>> {
    let len = block.transactions.len();
    let target = block
        .transactions
        .get(tx_index)
        .ok_or(RedactionError::TxIndexOutOfRange { index: tx_index, len })?;

    let mut transactions = block.transactions.clone();
    match kind {
        RedactionKind::Delete => {
            transactions.remove(tx_index);
        }
        RedactionKind::Modify => {
            let payload = replacement.cloned().unwrap_or(TxPayload::Redacted);
            transactions[tx_index] = target.with_payload(payload);
        }
        RedactionKind::Anonymize => {
            transactions[tx_index] = target.anonymized();
        }
    }
    Ok(transactions)
}
