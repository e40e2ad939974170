//! Correlation Listener.
//!
//! Registers on the runtime-message channel for one token and settles on the
//! first envelope carrying it. The registration is released before the
//! envelope is handed back, and also whenever the pending outcome is dropped
//! unsettled (a lost race or an aborted setup).

use crate::domain::correlation::CorrelationToken;
use crate::error::{ExecutionError, ExecutionResult};
use shared_bus::{EventFilter, EventTopic, HostEvent, InMemoryEventBus, Subscription};
use shared_types::OutcomeEnvelope;
use tracing::debug;

/// Filter every correlation listener registers with.
pub fn runtime_message_filter() -> EventFilter {
    EventFilter::topic(EventTopic::RuntimeMessage)
}

/// Entry point for registering a listener.
pub struct CorrelationListener;

impl CorrelationListener {
    /// Register for `token` now and return the pending outcome.
    ///
    /// Registration is synchronous, so anything broadcast after this returns
    /// is seen by the listener.
    pub fn listen(bus: &InMemoryEventBus, token: CorrelationToken) -> PendingOutcome {
        let subscription = bus.subscribe(runtime_message_filter());
        debug!(token = %token, "Correlation listener registered");
        PendingOutcome {
            token,
            subscription,
        }
    }
}

/// An unsettled outcome owned by exactly one invocation.
///
/// Timing out is not its job; race it against a timer.
pub struct PendingOutcome {
    token: CorrelationToken,
    subscription: Subscription,
}

impl PendingOutcome {
    /// The token being waited on.
    pub fn token(&self) -> &CorrelationToken {
        &self.token
    }

    /// Wait for the matching envelope.
    ///
    /// Unrelated or malformed messages are skipped and the listener stays
    /// registered. Returns `ChannelClosed` if the bus goes away first.
    pub async fn settle(self) -> ExecutionResult<OutcomeEnvelope> {
        let Self {
            token,
            mut subscription,
        } = self;

        loop {
            let payload = match subscription.recv().await {
                Some(HostEvent::RuntimeMessage { payload, .. }) => payload,
                Some(_) => continue,
                None => {
                    debug!(token = %token, "Bus closed while awaiting envelope");
                    subscription.unsubscribe();
                    return Err(ExecutionError::ChannelClosed);
                }
            };

            if OutcomeEnvelope::peek_token(&payload) != Some(token.as_str()) {
                continue;
            }
            let Some(envelope) = OutcomeEnvelope::from_value(&payload) else {
                continue;
            };

            subscription.unsubscribe();
            debug!(
                token = %token,
                failed = envelope.outcome.is_failure(),
                "Correlation listener settled"
            );
            return Ok(envelope);
        }
    }
}
