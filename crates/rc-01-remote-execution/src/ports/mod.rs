//! Ports for Remote Execution (hexagonal boundaries).

pub mod inbound;
pub mod outbound;
