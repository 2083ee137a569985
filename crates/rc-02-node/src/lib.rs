//! # Simulated Node
//!
//! Each node owns one main chain, a store of side-branch blocks, an orphan
//! buffer, a queue of redaction requests awaiting its vote, and optionally a
//! trapdoor key share. Consensus and redaction drive a node through its
//! methods; nodes never reference each other.

pub mod domain;

pub use domain::*;
