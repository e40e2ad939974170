//! Lifecycle Waiter
//!
//! Holds one subscription per host lifecycle channel plus a timer, and
//! feeds whatever concerns the awaited resource into [`WaitState`]. The
//! first terminal transition settles the wait; the three subscriptions and
//! the timer are released together when [`ArmedWait::wait_for`] returns.

use crate::domain::{LifecycleSignal, ResourceLoaded, WaitState};
use crate::error::{LifecycleError, LifecycleResult};
use shared_bus::{EventFilter, EventTopic, HostEvent, InMemoryEventBus, Subscription};
use shared_types::{ResourceId, ResourceInfo, ResourceStatus};
use std::time::Duration;
use tracing::{debug, warn};

/// Entry point for arming a wait.
pub struct LifecycleWaiter;

impl LifecycleWaiter {
    /// Register on all three lifecycle channels now.
    ///
    /// Arm before calling the triggering primitive; events published after
    /// this returns are never missed.
    pub fn arm(bus: &InMemoryEventBus) -> ArmedWait {
        let armed = ArmedWait {
            updated: bus.subscribe(EventFilter::topic(EventTopic::ResourceUpdated)),
            removed: bus.subscribe(EventFilter::topic(EventTopic::ResourceRemoved)),
            replaced: bus.subscribe(EventFilter::topic(EventTopic::ResourceReplaced)),
        };
        debug!("Lifecycle listeners armed");
        armed
    }
}

/// Registered listeners not yet bound to a resource.
///
/// Dropping it unused releases all three registrations.
pub struct ArmedWait {
    updated: Subscription,
    removed: Subscription,
    replaced: Subscription,
}

impl ArmedWait {
    /// Wait until `id` reaches its terminal status, or fails to.
    pub async fn wait_for(self, id: ResourceId, timeout: Duration) -> LifecycleResult<ResourceLoaded> {
        let Self {
            mut updated,
            mut removed,
            mut replaced,
        } = self;

        let deadline = tokio::time::sleep(timeout);
        tokio::pin!(deadline);

        let mut state = WaitState::Pending;
        let mut latest: Option<(ResourceStatus, ResourceInfo)> = None;

        debug!(resource = %id, timeout_ms = timeout.as_millis() as u64, "Waiting for resource");

        while !state.is_terminal() {
            // Delivered signals win ties with the deadline
            let signal = tokio::select! {
                biased;

                event = updated.recv() => match event {
                    Some(HostEvent::ResourceUpdated { id: updated_id, status, resource })
                        if updated_id == id =>
                    {
                        debug!(resource = %id, status = %status, "Resource progressed");
                        latest = Some((status, resource));
                        LifecycleSignal::Progressed(status)
                    }
                    Some(_) => continue,
                    None => return Err(LifecycleError::ChannelClosed { id }),
                },

                event = removed.recv() => match event {
                    Some(HostEvent::ResourceRemoved { id: removed_id }) if removed_id == id => {
                        LifecycleSignal::Removed
                    }
                    Some(_) => continue,
                    None => return Err(LifecycleError::ChannelClosed { id }),
                },

                event = replaced.recv() => match event {
                    Some(HostEvent::ResourceReplaced { added_id, removed_id }) if removed_id == id => {
                        LifecycleSignal::Replaced { replacement: added_id }
                    }
                    Some(_) => continue,
                    None => return Err(LifecycleError::ChannelClosed { id }),
                },

                () = &mut deadline => LifecycleSignal::DeadlineElapsed,
            };

            state = state.apply(signal);
        }

        match state {
            WaitState::Completed => match latest {
                Some((status, resource)) => {
                    debug!(resource = %id, "Resource completed");
                    Ok(ResourceLoaded {
                        id,
                        status,
                        resource,
                    })
                }
                // Completed is only reachable through a progression event
                None => Err(LifecycleError::ChannelClosed { id }),
            },
            WaitState::Destroyed => {
                debug!(resource = %id, "Resource removed before completion");
                Err(LifecycleError::Removed { id })
            }
            WaitState::Superseded { replacement } => {
                debug!(resource = %id, replacement = %replacement, "Resource replaced before completion");
                Err(LifecycleError::Replaced { id, replacement })
            }
            WaitState::TimedOut | WaitState::Pending => {
                warn!(resource = %id, timeout_ms = timeout.as_millis() as u64, "Lifecycle wait timed out");
                Err(LifecycleError::TimedOut {
                    id,
                    elapsed_ms: timeout.as_millis() as u64,
                })
            }
        }
    }
}
