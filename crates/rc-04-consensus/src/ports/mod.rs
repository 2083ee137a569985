//! Ports for consensus

pub mod outbound;

pub use outbound::*;
