//! Domain layer for simulated nodes

pub mod error;
pub mod node;
pub mod sync;

pub use error::*;
pub use node::*;
pub use sync::*;
