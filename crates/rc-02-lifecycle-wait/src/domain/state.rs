//! Lifecycle wait state machine
//!
//! State Machine:
//! ```text
//!                ┌── Progressed(complete) ──→ [COMPLETED]
//!                │
//! [PENDING] ─────┼── Removed ────────────────→ [DESTROYED]
//!    │   ↑       │
//!    └───┘       ├── Replaced { replacement } → [SUPERSEDED]
//! Progressed     │
//! (not terminal) └── DeadlineElapsed ────────→ [TIMED OUT]
//! ```
//!
//! Every state except `Pending` is terminal and absorbs further signals, so
//! at most one transition ever leaves `Pending`.

use shared_types::{ResourceId, ResourceStatus};

/// Where a single wait stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum WaitState {
    /// Still waiting for the terminal status
    #[default]
    Pending,
    /// Reached the terminal status
    Completed,
    /// Destroyed before completion
    Destroyed,
    /// Superseded before completion
    Superseded { replacement: ResourceId },
    /// Bound elapsed before completion
    TimedOut,
}

/// A signal already filtered down to the awaited resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleSignal {
    /// The resource reported a new status marker
    Progressed(ResourceStatus),
    /// The resource was destroyed
    Removed,
    /// The resource was superseded by `replacement`
    Replaced { replacement: ResourceId },
    /// The timer fired
    DeadlineElapsed,
}

impl WaitState {
    /// Transition on `signal`.
    #[must_use]
    pub fn apply(self, signal: LifecycleSignal) -> Self {
        if self.is_terminal() {
            return self;
        }
        match signal {
            LifecycleSignal::Progressed(status) if status.is_terminal() => Self::Completed,
            LifecycleSignal::Progressed(_) => Self::Pending,
            LifecycleSignal::Removed => Self::Destroyed,
            LifecycleSignal::Replaced { replacement } => Self::Superseded { replacement },
            LifecycleSignal::DeadlineElapsed => Self::TimedOut,
        }
    }

    /// Whether the wait is settled.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}
