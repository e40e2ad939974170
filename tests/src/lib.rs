//! # Remote Context Bridge Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/          # Cross-crate flows against the simulated host
//!     ├── remote_execution.rs
//!     └── lifecycle.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p rc-tests
//! cargo test -p rc-tests integration::lifecycle::
//! ```
//!
//! Timing properties run under paused tokio time, so they are exact and fast.

pub mod integration;
