//! # Shared Types Crate
//!
//! This crate contains the identifiers, the role capability table, and the
//! read-only `SimulationConfig` used by every subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Roles and redaction kinds are closed enums;
//!   permission checks are exhaustive matches, never string comparisons.
//! - **Explicit Configuration**: `SimulationConfig` is constructed once at
//!   startup and passed by reference. There is no process-wide mutable config.
//! - **Logical Time**: All timestamps are logical ticks, not wall-clock time.

pub mod config;
pub mod entities;
pub mod errors;

pub use config::*;
pub use entities::*;
pub use errors::*;
