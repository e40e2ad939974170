//! # rc-01-remote-execution
//!
//! Runs a unit of work inside a remote execution context and returns its
//! outcome, although the host's injection primitive only reports that the
//! code was injected.
//!
//! ## Overview
//!
//! - **Invocation Wrapper**: the work is wrapped so its result or error is
//!   broadcast back in an envelope tagged with a fresh correlation token
//! - **Correlation Listener**: one registration per call, settled by the
//!   first envelope carrying its token
//! - **Race Coordinator**: the listener races a timeout; whichever loses is
//!   torn down
//!
//! ## Architecture
//!
//! ```text
//! caller ──RemoteCall──→ RemoteExecutionService
//!                             │ render(work, token, args)
//!                             ▼
//!                        RaceCoordinator ──listen(token)──→ Event Bus
//!                             │                                 ↑
//!                             ├── inject(target, payload) ──→ Host
//!                             │                                 │
//!                             │        envelope {token, content|error}
//!                             ▼                                 │
//!                   Value | Remote error | TimedOut  ←──────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use rc_01_remote_execution::{ExecutionConfig, RemoteCall, RemoteExecutionService};
//! use rc_01_remote_execution::ports::inbound::RemoteExecutionApi;
//!
//! let service = RemoteExecutionService::new(ExecutionConfig::default(), bus, injector);
//!
//! let call = RemoteCall::new("(sel) => document.querySelector(sel).textContent")
//!     .arg("h1")?
//!     .timeout(Duration::from_secs(2));
//! let heading = service.execute_remote(target, call).await?;
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod config;
pub mod coordinator;
pub mod domain;
pub mod error;
pub mod listener;
pub mod ports;
pub mod service;

pub use config::{ExecutionConfig, DEFAULT_EXECUTION_TIMEOUT_MS};
pub use coordinator::{ExecutionStats, RaceCoordinator};
pub use domain::{
    build_payload, embedded_token, CorrelationToken, EncodedArg, InjectionPayload,
    PayloadTemplate, RemoteFunction, RunAt, ScriptDetails, UnitOfWork,
    DEFAULT_BROADCAST_FUNCTION,
};
pub use error::{ExecutionError, ExecutionResult};
pub use listener::{runtime_message_filter, CorrelationListener, PendingOutcome};
pub use ports::inbound::RemoteExecutionApi;
pub use ports::outbound::ScriptInjector;
pub use service::{RemoteCall, RemoteExecutionService};
