//! # Ledger Data Model
//!
//! Blocks, transactions and per-node chains for a redactable blockchain.
//!
//! ## Chain-Validity Invariant
//!
//! For every block at every moment:
//!
//! ```text
//! block.id.hash == CH(H(previous_id ‖ transactions), block.id.randomness)
//! ```
//!
//! Blocks are mutated only by `Block::apply_redaction`, which refuses any
//! change that would break the invariant. Because `id.hash` is stable, a
//! redaction never disturbs the `previous_id` of descendant blocks.

pub mod domain;

pub use domain::*;
