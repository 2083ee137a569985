//! # Event Handlers
//!
//! One handler per scheduler event kind, implemented on
//! `SimulationContainer`.

pub mod governance;
pub mod mining;
pub mod propagation;

pub use propagation::broadcast;
