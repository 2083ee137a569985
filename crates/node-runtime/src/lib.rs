//! # Node Runtime Library
//!
//! Wires the subsystem crates into a runnable simulation. The binary in
//! `main.rs` loads the configuration, runs the simulation and prints the
//! report; the library exposes the same pieces for tests.
//!
//! ## Modular Structure
//!
//! - `container/` - configuration loading and the simulation state container
//! - `genesis/` - key ceremony and the shared genesis block
//! - `handlers/` - one handler per scheduler event kind
//! - `wiring/` - event routing and the `Simulation` driver
//! - `workload` - synthetic transaction batches
//! - `report` - end-of-run summary

#![allow(clippy::too_many_lines)]

pub mod container;
pub mod errors;
pub mod genesis;
pub mod handlers;
pub mod report;
pub mod wiring;
pub mod workload;

pub use container::{load_config, SimulationContainer};
pub use errors::{RuntimeError, RuntimeResult};
pub use report::{NodeReport, RedactionReport, RequestReport, RunReport};
pub use wiring::Simulation;
pub use workload::WorkloadGenerator;
