//! # Simulation Container
//!
//! Configuration loading and the container holding every subsystem
//! instance the event handlers drive.

pub mod config;
pub mod subsystems;

pub use config::{apply_env_overrides, load_config, parse_config};
pub use subsystems::{ConcreteConsensusService, RuntimeStats, SimulationContainer};
