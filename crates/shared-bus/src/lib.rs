//! # Shared Bus - Broadcast Channel Between Controller And Remote Contexts
//!
//! Remote contexts have no reply channel. The only way back is a one-way
//! message that every listener on the host side receives.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │ Remote       │                    │ Controller   │
//! │ context      │    publish()       │ (listener)   │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! The host's resource lifecycle channels (progression, destruction,
//! supersession) travel over the same bus, one topic each.
//!
//! Each subscription is an owned handle: registering returns it, dropping it
//! deregisters. No collection of pending waits is kept here.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{EventFilter, EventTopic, HostEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before the oldest are dropped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
