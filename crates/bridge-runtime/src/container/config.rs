//! # Bridge Configuration
//!
//! Unified configuration for both services and the shared bus.
//!
//! All timeouts have sane defaults with override capability; a zero default
//! would turn every call into an immediate timeout and is rejected.

use rc_01_remote_execution::ExecutionConfig;
use rc_02_lifecycle_wait::LifecycleConfig;
use serde::{Deserialize, Serialize};
use shared_bus::DEFAULT_CHANNEL_CAPACITY;
use std::env;
use thiserror::Error;

/// Complete bridge configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Remote execution configuration.
    pub execution: ExecutionConfig,
    /// Lifecycle wait configuration.
    pub lifecycle: LifecycleConfig,
    /// Events buffered per subscriber before the oldest are dropped.
    pub bus_capacity: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            execution: ExecutionConfig::default(),
            lifecycle: LifecycleConfig::default(),
            bus_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl BridgeConfig {
    /// Defaults overridden from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `RC_EXECUTION_TIMEOUT_MS`: remote execution default timeout
    /// - `RC_LIFECYCLE_TIMEOUT_MS`: lifecycle wait default timeout
    /// - `RC_BUS_CAPACITY`: per-subscriber buffer
    /// - `RC_BROADCAST_FUNCTION`: host function the payload reports through
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(ms) = parse_var(&lookup, "RC_EXECUTION_TIMEOUT_MS")? {
            config.execution.default_timeout_ms = ms;
        }
        if let Some(ms) = parse_var(&lookup, "RC_LIFECYCLE_TIMEOUT_MS")? {
            config.lifecycle.default_timeout_ms = ms;
        }
        if let Some(capacity) = parse_var(&lookup, "RC_BUS_CAPACITY")? {
            config.bus_capacity = capacity;
        }
        if let Some(function) = lookup("RC_BROADCAST_FUNCTION") {
            config.execution.broadcast_function = function;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.execution.default_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout { field: "execution" });
        }
        if self.lifecycle.default_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout { field: "lifecycle" });
        }
        if self.bus_capacity == 0 {
            return Err(ConfigError::ZeroBusCapacity);
        }
        if self.execution.broadcast_function.trim().is_empty() {
            return Err(ConfigError::EmptyBroadcastFunction);
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    lookup(var)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidVariable { var, value })
        })
        .transpose()
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A default timeout is zero.
    #[error("{field} default timeout must be positive")]
    ZeroTimeout { field: &'static str },

    /// The bus cannot buffer anything.
    #[error("Bus capacity must be positive")]
    ZeroBusCapacity,

    /// No host function to report through.
    #[error("Broadcast function must not be empty")]
    EmptyBroadcastFunction,

    /// An environment variable did not parse.
    #[error("Invalid value {value:?} for {var}")]
    InvalidVariable { var: &'static str, value: String },
}
