//! Race Coordinator - one injected payload to one time-bounded outcome.
//!
//! Flow:
//! 1. Register the correlation listener (before anything can be broadcast)
//! 2. Call the injection primitive; a failure ends the call and drops the listener
//! 3. Race the listener against the timeout
//! 4. The loser is dropped, which releases its registration or timer

use crate::domain::correlation::CorrelationToken;
use crate::domain::payload::InjectionPayload;
use crate::error::{ExecutionError, ExecutionResult};
use crate::listener::CorrelationListener;
use crate::ports::outbound::ScriptInjector;
use shared_bus::InMemoryEventBus;
use shared_types::{ExecutionTarget, OutcomeEnvelope, RemoteOutcome};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Counters for remote invocations
#[derive(Debug, Default)]
pub struct ExecutionStats {
    /// Calls refused before injection (bad payload or argument)
    pub total_rejected: AtomicU64,
    /// Invocations that reached the injection step
    pub total_started: AtomicU64,
    /// Invocations that resolved with a value
    pub total_succeeded: AtomicU64,
    /// Invocations whose work threw remotely
    pub total_remote_failures: AtomicU64,
    /// Invocations that timed out
    pub total_timeouts: AtomicU64,
    /// Invocations whose injection failed
    pub total_injection_failures: AtomicU64,
    /// Invocations cut short by the bus closing
    pub total_channel_closed: AtomicU64,
}

impl ExecutionStats {
    /// Invocations started but not yet settled.
    pub fn in_flight(&self) -> u64 {
        let settled = self.total_succeeded.load(Ordering::Relaxed)
            + self.total_remote_failures.load(Ordering::Relaxed)
            + self.total_timeouts.load(Ordering::Relaxed)
            + self.total_injection_failures.load(Ordering::Relaxed)
            + self.total_channel_closed.load(Ordering::Relaxed);
        self.total_started
            .load(Ordering::Relaxed)
            .saturating_sub(settled)
    }
}

/// Combines the correlation listener with the injection primitive and a timer.
pub struct RaceCoordinator<I: ScriptInjector> {
    injector: Arc<I>,
    bus: Arc<InMemoryEventBus>,
    stats: Arc<ExecutionStats>,
}

impl<I: ScriptInjector> RaceCoordinator<I> {
    pub fn new(injector: Arc<I>, bus: Arc<InMemoryEventBus>) -> Self {
        Self {
            injector,
            bus,
            stats: Arc::new(ExecutionStats::default()),
        }
    }

    /// Statistics
    pub fn stats(&self) -> &ExecutionStats {
        &self.stats
    }

    /// Inject `payload` into `target` and wait for the envelope tagged `token`.
    ///
    /// `payload` must have been rendered for `token`.
    pub async fn execute(
        &self,
        target: ExecutionTarget,
        payload: InjectionPayload,
        token: CorrelationToken,
        timeout: Duration,
    ) -> ExecutionResult<Option<serde_json::Value>> {
        self.stats.total_started.fetch_add(1, Ordering::Relaxed);

        let pending = CorrelationListener::listen(&self.bus, token);

        if let Err(source) = self.injector.inject(target, &payload).await {
            warn!(
                token = %pending.token(),
                target = %target,
                error = %source,
                "Injection failed"
            );
            drop(pending);
            self.stats
                .total_injection_failures
                .fetch_add(1, Ordering::Relaxed);
            return Err(ExecutionError::InjectionFailed { target, source });
        }

        debug!(
            token = %pending.token(),
            target = %target,
            timeout_ms = timeout.as_millis() as u64,
            "Payload injected, awaiting envelope"
        );

        let started = Instant::now();
        match tokio::time::timeout(timeout, pending.settle()).await {
            Ok(Ok(envelope)) => self.translate(target, envelope, started),
            Ok(Err(e)) => {
                self.stats
                    .total_channel_closed
                    .fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
            Err(_) => {
                self.stats.total_timeouts.fetch_add(1, Ordering::Relaxed);
                warn!(
                    target = %target,
                    timeout_ms = timeout.as_millis() as u64,
                    "Remote execution timed out"
                );
                Err(ExecutionError::TimedOut {
                    elapsed_ms: timeout.as_millis() as u64,
                })
            }
        }
    }

    fn translate(
        &self,
        target: ExecutionTarget,
        envelope: OutcomeEnvelope,
        started: Instant,
    ) -> ExecutionResult<Option<serde_json::Value>> {
        let response_time_ms = started.elapsed().as_millis() as u64;
        match envelope.outcome {
            RemoteOutcome::Success(content) => {
                self.stats.total_succeeded.fetch_add(1, Ordering::Relaxed);
                debug!(
                    token = %envelope.token,
                    target = %target,
                    response_time_ms,
                    "Remote execution succeeded"
                );
                Ok(content)
            }
            RemoteOutcome::Failure(error) => {
                self.stats
                    .total_remote_failures
                    .fetch_add(1, Ordering::Relaxed);
                debug!(
                    token = %envelope.token,
                    target = %target,
                    response_time_ms,
                    "Remote execution threw"
                );
                Err(ExecutionError::Remote {
                    name: error.name,
                    message: error.message,
                    stack: error.stack,
                })
            }
        }
    }
}
