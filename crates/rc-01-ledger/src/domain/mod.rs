//! Domain layer for the ledger data model

pub mod block;
pub mod chain;
pub mod error;
pub mod transaction;

pub use block::*;
pub use chain::*;
pub use error::*;
pub use transaction::*;
