//! # Bridge Telemetry
//!
//! Log output for the remote context bridge, built on `tracing-subscriber`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bridge_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let _guard = init_telemetry(TelemetryConfig::from_env()).expect("telemetry");
//!     // bridge code logs through `tracing` from here on
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RC_SERVICE_NAME` | `remote-bridge` | Service name on every line |
//! | `RC_LOG_LEVEL` / `RUST_LOG` | `info` | Level filter or directives |
//! | `RC_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `RC_JSON_LOGS` | `false` (`true` in containers) | JSON lines |

mod config;
mod logging;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use tracing_setup::{build_filter, TracingGuard};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("A global tracing subscriber is already installed: {0}")]
    AlreadyInitialized(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Install log output for the process.
///
/// Returns a guard to hold for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let tracing = tracing_setup::init_tracing(&config)?;
    Ok(TelemetryGuard { tracing })
}

/// Guard that keeps telemetry active.
#[derive(Debug)]
pub struct TelemetryGuard {
    tracing: TracingGuard,
}

impl TelemetryGuard {
    /// Service name logs are attributed to.
    pub fn service_name(&self) -> &str {
        self.tracing.service_name()
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.tracing.service_name(), "Shutting down telemetry");
    }
}
