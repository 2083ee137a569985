//! Ports for redaction

pub mod outbound;

pub use outbound::*;
