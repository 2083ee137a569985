//! # Discrete-Event Scheduler
//!
//! Single-threaded priority queue of events keyed by logical time.
//!
//! ## Guarantees
//!
//! - Events fire in non-decreasing time order
//! - Events with equal timestamps fire in insertion order
//! - No event can be scheduled in the past
//! - Every random draw goes through one seeded RNG, so a seed fully
//!   determines a run

pub mod domain;
pub mod ports;

pub use domain::*;
pub use ports::EventHandler;
