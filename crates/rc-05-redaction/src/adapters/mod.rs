//! Adapters implementing redaction ports

pub mod commitment;

pub use commitment::*;
