//! # Bridge Runtime
//!
//! Wires the remote context bridge together.
//!
//! ```text
//!                 ┌──────────────────── BridgeRuntime ────────────────────┐
//!                 │                                                       │
//!  execute_remote │  RemoteExecutionService ──┐        ┌── LifecycleService│ create_and_wait
//! ───────────────→│                            ▼        ▼                  │←──────────────
//!                 │                     host: ScriptInjector + ResourceHost│ reload_and_wait
//!                 │                            │                          │
//!                 │                            ▼                          │
//!                 │                     InMemoryEventBus (shared)         │
//!                 └───────────────────────────────────────────────────────┘
//! ```
//!
//! [`SimulatedHost`] stands in for a real host environment in tests.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod adapters;
pub mod container;

pub use adapters::{
    InjectionRecord, LifecyclePlan, LifecycleStep, ScriptBehaviour, ScriptPlan, SimulatedHost,
};
pub use container::{BridgeConfig, BridgeRuntime, ConfigError};
