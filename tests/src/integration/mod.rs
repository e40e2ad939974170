//! # Integration Tests
//!
//! Tests build a [`BridgeRuntime`] over the [`SimulatedHost`] and drive it
//! through the public operations.

pub mod lifecycle;
pub mod remote_execution;

use bridge_runtime::{BridgeConfig, BridgeRuntime, SimulatedHost};
use bridge_telemetry::{init_telemetry, TelemetryConfig, TelemetryGuard};
use std::sync::OnceLock;

static TELEMETRY: OnceLock<Option<TelemetryGuard>> = OnceLock::new();

/// Install test logging once per process (`RUST_LOG=debug` to see it).
pub fn init_test_logging() {
    TELEMETRY.get_or_init(|| {
        let config = TelemetryConfig {
            service_name: "rc-tests".to_string(),
            log_level: "warn".to_string(),
            ..TelemetryConfig::default()
        };
        // Another harness may already own the global subscriber
        init_telemetry(config).ok()
    });
}

/// Runtime with default configuration over a fresh simulated host.
pub fn runtime() -> BridgeRuntime<SimulatedHost> {
    runtime_with(BridgeConfig::default())
}

/// Runtime with `config` over a fresh simulated host.
pub fn runtime_with(config: BridgeConfig) -> BridgeRuntime<SimulatedHost> {
    init_test_logging();
    match BridgeRuntime::simulated(config) {
        Ok(runtime) => runtime,
        Err(e) => panic!("invalid test configuration: {}", e),
    }
}
