//! Ports for Lifecycle Wait (hexagonal boundaries).

pub mod inbound;
pub mod outbound;
