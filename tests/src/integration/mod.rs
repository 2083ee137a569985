//! # Integration Tests
//!
//! Cross-crate tests. Each module holds a `#[cfg(test)] mod tests`.

pub mod flows;
pub mod scenarios;
