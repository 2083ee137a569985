//! Domain layer for the scheduler

pub mod error;
pub mod event;
pub mod scheduler;

pub use error::*;
pub use event::*;
pub use scheduler::*;
