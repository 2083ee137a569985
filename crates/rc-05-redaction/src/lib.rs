//! # Redaction Subsystem
//!
//! Governs rewrites of historical transactions: role-based policies,
//! approval quorums, time locks, and the chameleon-hash forge that lets a
//! block change its contents while keeping its id.
//!
//! ## Architecture
//!
//! - `domain/`: policy book, request lifecycle, redaction operations, proofs
//! - `ports/`: `ProofSystem` (outbound)
//! - `adapters/`: `CommitmentProofSystem`
//! - `service/`: `RedactionEngine`
//!
//! ## Request Lifecycle
//!
//! `PENDING → QUORUM_REACHED → EXECUTED`, with `EXPIRED` once the approval
//! window closes and `REJECTED` on any policy, forge or proof failure. Votes
//! are counted only from roles the governing policy authorizes.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::*;
pub use domain::*;
pub use ports::*;
pub use service::*;
