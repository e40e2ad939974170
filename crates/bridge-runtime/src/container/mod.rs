//! # Bridge Container
//!
//! Holds the shared bus and both services with one host behind them.
//!
//! - The bus is created once and shared by the host and every listener
//! - The host implements both outbound ports

pub mod config;
pub mod runtime;

pub use config::{BridgeConfig, ConfigError};
pub use runtime::BridgeRuntime;
