//! # Shared Types Crate
//!
//! This crate contains the identifiers, resource vocabulary and the outcome
//! envelope exchanged between the controller and remote execution contexts.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: The envelope wire shape is defined once here.
//! - **Typed Outcomes**: A decoded envelope is a success *or* a failure, never
//!   a pair of optional fields the caller has to inspect.
//! - **Identity Does Not Cross**: Remote errors arrive as plain records of
//!   text, never as live error objects.

pub mod entities;
pub mod envelope;
pub mod errors;

pub use entities::*;
pub use envelope::{OutcomeEnvelope, RemoteError, RemoteOutcome};
pub use errors::*;
