//! # Redact-Chain Test Suite
//!
//! Unified test crate for behavior that spans several subsystems.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── scenarios.rs  # Reference scenarios: lottery, quorum, redaction, fork
//!     └── flows.rs      # Full simulation runs through node-runtime
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p rc-tests
//!
//! # By category
//! cargo test -p rc-tests integration::scenarios
//! cargo test -p rc-tests integration::flows
//! ```

#![allow(dead_code)]

pub mod integration;
