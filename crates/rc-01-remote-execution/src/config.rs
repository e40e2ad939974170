//! Remote Execution configuration.

use crate::domain::payload::DEFAULT_BROADCAST_FUNCTION;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default bound on a remote invocation.
pub const DEFAULT_EXECUTION_TIMEOUT_MS: u64 = 10_000;

/// Remote execution configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Timeout used when a call sets none (or zero).
    pub default_timeout_ms: u64,
    /// Host function the payload reports through.
    pub broadcast_function: String,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: DEFAULT_EXECUTION_TIMEOUT_MS,
            broadcast_function: DEFAULT_BROADCAST_FUNCTION.to_owned(),
        }
    }
}

impl ExecutionConfig {
    /// The default timeout as a duration.
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    /// Timeout to use for one call.
    ///
    /// Absent or zero falls back to the default; a positive value is used verbatim.
    pub fn resolve_timeout(&self, requested: Option<Duration>) -> Duration {
        match requested {
            Some(timeout) if !timeout.is_zero() => timeout,
            _ => self.default_timeout(),
        }
    }
}
