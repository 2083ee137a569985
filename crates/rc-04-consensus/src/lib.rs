//! # Consensus Subsystem
//!
//! Proof-of-work style longest/heaviest-chain consensus for the simulator.
//!
//! ## Architecture
//!
//! - `domain/`: leader lottery, fork choice, errors (pure)
//! - `ports/`: `ContractExecutor` (outbound)
//! - `adapters/`: `GasMeteredExecutor`
//! - `service/`: `ConsensusService` (block assembly and reception)
//!
//! ## Per-Node State Machine
//!
//! `SYNCED ⇄ FORKED ⇄ RESOLVING ⇄ SYNCED`, driven by the classification of
//! every received block. Only a strictly heavier branch triggers a
//! reorganization; on equal weight the first-seen block is kept.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::*;
pub use domain::*;
pub use ports::*;
pub use service::*;
