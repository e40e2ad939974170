//! # Event Publisher
//!
//! The sending side of the bus: a remote context's `broadcastSend` and the
//! host's lifecycle event sources both end up in [`EventPublisher::publish`].

use crate::events::{EventFilter, HostEvent};
use crate::subscriber::{Registry, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, trace, warn};

/// Trait for publishing events to the bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event, returning how many live subscriptions saw it.
    ///
    /// Zero is not an error; an event nobody listens for is lost.
    async fn publish(&self, event: HostEvent) -> usize;

    /// Total events published so far.
    fn events_published(&self) -> u64;
}

/// In-memory bus over `tokio::sync::broadcast`.
///
/// Every subscriber sees every event and filters locally.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<HostEvent>,
    registry: Arc<Registry>,
    events_published: AtomicU64,
    capacity: usize,
}

impl InMemoryEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Bus buffering up to `capacity` events per lagging subscriber.
    ///
    /// All subscriptions share one ring. A subscriber that falls more than
    /// `capacity` events behind loses the oldest ones, whatever their topic,
    /// so a burst of unrelated traffic can evict the envelope or terminal
    /// status a pending wait needs; that wait then ends in its timeout. Size
    /// the capacity for the busiest expected burst.
    ///
    /// # Panics
    ///
    /// If `capacity` is zero (tokio's broadcast channel requires at least one slot).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            registry: Arc::new(Registry::default()),
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Register a listener for events matching `filter`.
    ///
    /// The subscription sees every event published after this call returns.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(topics = ?filter.topics, "New subscription created");
        Subscription::new(self.sender.subscribe(), filter, self.registry.clone())
    }

    /// Live subscriptions of any filter.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Live subscriptions registered with exactly this filter.
    #[must_use]
    pub fn active_subscriptions(&self, filter: &EventFilter) -> usize {
        self.registry.count(filter)
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: HostEvent) -> usize {
        let topic = event.topic();
        self.events_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(event) {
            Ok(receivers) => {
                trace!(topic = ?topic, receivers, "Event published");
                receivers
            }
            Err(_) => {
                warn!(topic = ?topic, "Event dropped (no receivers)");
                0
            }
        }
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
