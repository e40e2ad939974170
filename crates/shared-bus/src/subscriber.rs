//! # Event Subscriber
//!
//! The listening side of the bus (the host's `broadcastListen` /
//! `broadcastUnlisten` pair). A registration is an owned [`Subscription`];
//! the [`Registry`] only counts live handles per filter.

use crate::events::{EventFilter, EventTopic, HostEvent};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{trace, warn};

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The event bus was closed.
    #[error("Event bus closed")]
    Closed,
}

/// Live subscription counts, keyed by the filter's topic list.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    counts: Mutex<HashMap<Vec<EventTopic>, usize>>,
}

impl Registry {
    pub(crate) fn register(&self, filter: &EventFilter) {
        *self.counts.lock().entry(filter.topics.clone()).or_insert(0) += 1;
    }

    pub(crate) fn count(&self, filter: &EventFilter) -> usize {
        self.counts.lock().get(&filter.topics).copied().unwrap_or(0)
    }

    fn release(&self, filter: &EventFilter) {
        let mut counts = self.counts.lock();
        if let Some(count) = counts.get_mut(&filter.topics) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                counts.remove(&filter.topics);
            }
        }
    }
}

/// A registered listener.
///
/// The registration lives exactly as long as the handle. Dropping it, or
/// calling [`Subscription::unsubscribe`], deregisters it once.
pub struct Subscription {
    receiver: broadcast::Receiver<HostEvent>,
    filter: EventFilter,
    registry: Arc<Registry>,
}

impl Subscription {
    pub(crate) fn new(
        receiver: broadcast::Receiver<HostEvent>,
        filter: EventFilter,
        registry: Arc<Registry>,
    ) -> Self {
        registry.register(&filter);
        Self {
            receiver,
            filter,
            registry,
        }
    }

    /// Wait for the next event that matches the filter.
    ///
    /// Returns `None` once the bus is gone. A lagged receiver skips ahead and
    /// the events it missed are lost, matching ones included.
    pub async fn recv(&mut self) -> Option<HostEvent> {
        loop {
            let event = match self.receiver.recv().await {
                Ok(e) => e,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    warn!(lagged = count, "Subscriber lagged, some events dropped");
                    continue;
                }
            };

            if self.filter.matches(&event) {
                return Some(event);
            }
        }
    }

    /// Drain the next matching event already buffered, if any.
    ///
    /// `Ok(None)` means nothing matching is buffered right now.
    pub fn try_recv(&mut self) -> Result<Option<HostEvent>, SubscriptionError> {
        loop {
            let event = match self.receiver.try_recv() {
                Ok(e) => e,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(count)) => {
                    warn!(lagged = count, "Subscriber lagged, some events dropped");
                    continue;
                }
            };

            if self.filter.matches(&event) {
                return Ok(Some(event));
            }
        }
    }

    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    /// Deregister now instead of at end of scope.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.release(&self.filter);
        trace!(topics = ?self.filter.topics, "Subscription dropped");
    }
}
