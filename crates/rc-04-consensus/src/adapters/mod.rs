//! Adapters implementing consensus ports

pub mod gas_metered;

pub use gas_metered::*;
