//! Domain layer for consensus

pub mod error;
pub mod fork_choice;
pub mod leader;

pub use error::*;
pub use fork_choice::*;
pub use leader::*;
