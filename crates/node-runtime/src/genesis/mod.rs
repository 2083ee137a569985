//! # Genesis Module
//!
//! Key ceremony and the shared genesis block.
//!
//! The genesis block has height 0, `previous_id = 0` and zero randomness, so
//! every node computes the same id from the shared public key.

pub mod builder;

pub use builder::{Genesis, GenesisBuilder};
