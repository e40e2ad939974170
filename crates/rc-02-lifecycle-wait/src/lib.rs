//! # rc-02-lifecycle-wait
//!
//! Create or reload a hosted resource and wait until it has finished
//! loading, telling apart completion, destruction, supersession and timeout.
//!
//! ## Architecture
//!
//! ```text
//! caller ──create_and_wait / reload_and_wait──→ LifecycleService
//!                                                   │ arm()
//!                                                   ▼
//!            Event Bus ──ResourceUpdated──┐    ArmedWait
//!                      ──ResourceRemoved──┼──→   │ select! { 3 channels, deadline }
//!                      ──ResourceReplaced─┘      ▼
//!                                            WaitState::apply
//!                                                   │
//!                            ResourceLoaded | Removed | Replaced | TimedOut
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use rc_02_lifecycle_wait::{LifecycleConfig, LifecycleService};
//! use rc_02_lifecycle_wait::ports::inbound::LifecycleApi;
//!
//! let service = LifecycleService::new(LifecycleConfig::default(), bus, host);
//! let loaded = service
//!     .create_and_wait(CreateProperties::with_url("https://example.org"), None)
//!     .await?;
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;
pub mod waiter;

pub use config::{LifecycleConfig, DEFAULT_LIFECYCLE_TIMEOUT_MS};
pub use domain::{LifecycleSignal, ResourceLoaded, WaitState};
pub use error::{LifecycleError, LifecycleResult};
pub use ports::inbound::LifecycleApi;
pub use ports::outbound::ResourceHost;
pub use service::{LifecycleService, LifecycleStats};
pub use waiter::{ArmedWait, LifecycleWaiter};
