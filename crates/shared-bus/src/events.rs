//! # Host Events
//!
//! Defines all event types that flow through the shared bus: notifications
//! broadcast by remote contexts and the host's resource lifecycle events.

use serde::{Deserialize, Serialize};
use shared_types::entities::{ExecutionTarget, ResourceId, ResourceInfo, ResourceStatus};

/// All events that can be published to the bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HostEvent {
    // =========================================================================
    // RUNTIME MESSAGES (broadcast from remote contexts)
    // =========================================================================
    /// A one-way message sent from inside a remote context.
    ///
    /// The payload is arbitrary; outcome envelopes are one shape among many.
    RuntimeMessage {
        /// The context that sent it, when the host knows.
        sender: Option<ExecutionTarget>,
        /// Raw message body.
        payload: serde_json::Value,
    },

    // =========================================================================
    // RESOURCE LIFECYCLE (broadcast by the host)
    // =========================================================================
    /// A resource progressed to a new load status.
    ResourceUpdated {
        /// The resource that changed.
        id: ResourceId,
        /// The status marker it reached.
        status: ResourceStatus,
        /// Snapshot after the change.
        resource: ResourceInfo,
    },

    /// A resource was destroyed.
    ResourceRemoved {
        /// The destroyed resource.
        id: ResourceId,
    },

    /// A resource was superseded by another one.
    ResourceReplaced {
        /// The resource that took its place.
        added_id: ResourceId,
        /// The resource that was replaced.
        removed_id: ResourceId,
    },
}

impl HostEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::RuntimeMessage { .. } => EventTopic::RuntimeMessage,
            Self::ResourceUpdated { .. } => EventTopic::ResourceUpdated,
            Self::ResourceRemoved { .. } => EventTopic::ResourceRemoved,
            Self::ResourceReplaced { .. } => EventTopic::ResourceReplaced,
        }
    }

    /// Resource this event concerns, if any.
    ///
    /// For a replacement this is the superseded side.
    #[must_use]
    pub fn resource_id(&self) -> Option<ResourceId> {
        match self {
            Self::RuntimeMessage { .. } => None,
            Self::ResourceUpdated { id, .. } | Self::ResourceRemoved { id } => Some(*id),
            Self::ResourceReplaced { removed_id, .. } => Some(*removed_id),
        }
    }
}

/// Event topics for subscription filtering.
///
/// Each topic is one host channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Messages broadcast from remote contexts.
    RuntimeMessage,
    /// Resource progression events.
    ResourceUpdated,
    /// Resource destruction events.
    ResourceRemoved,
    /// Resource supersession events.
    ResourceReplaced,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics }
    }

    /// Create a filter for a single topic.
    #[must_use]
    pub fn topic(topic: EventTopic) -> Self {
        Self::topics(vec![topic])
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &HostEvent) -> bool {
        self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic())
    }
}
