//! Lifecycle Wait configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default bound on a lifecycle wait.
pub const DEFAULT_LIFECYCLE_TIMEOUT_MS: u64 = 120_000;

/// Lifecycle wait configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Timeout used when a call sets none (or zero).
    pub default_timeout_ms: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: DEFAULT_LIFECYCLE_TIMEOUT_MS,
        }
    }
}

impl LifecycleConfig {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    /// Absent or zero falls back to the default.
    pub fn resolve_timeout(&self, requested: Option<Duration>) -> Duration {
        requested
            .filter(|timeout| !timeout.is_zero())
            .unwrap_or_else(|| self.default_timeout())
    }
}
