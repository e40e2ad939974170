//! Lifecycle Service - trigger a host action, then wait on its lifecycle.
//!
//! The waiter is armed before the primitive runs, so a host that finishes
//! loading before replying cannot slip its terminal event past us. When the
//! primitive fails, the armed waiter is dropped with the error.

use crate::config::LifecycleConfig;
use crate::domain::ResourceLoaded;
use crate::error::{LifecycleError, LifecycleResult};
use crate::ports::inbound::LifecycleApi;
use crate::ports::outbound::ResourceHost;
use crate::waiter::{ArmedWait, LifecycleWaiter};
use async_trait::async_trait;
use shared_bus::InMemoryEventBus;
use shared_types::{CreateProperties, ReloadProperties, ResourceId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Counters for lifecycle waits
#[derive(Debug, Default)]
pub struct LifecycleStats {
    /// Waits started (primitive accepted)
    pub total_started: AtomicU64,
    /// Waits that reached the terminal status
    pub total_completed: AtomicU64,
    /// Waits ended by destruction
    pub total_destroyed: AtomicU64,
    /// Waits ended by supersession
    pub total_superseded: AtomicU64,
    /// Waits that timed out
    pub total_timeouts: AtomicU64,
    /// Create or reload primitives that failed
    pub total_primitive_failures: AtomicU64,
    /// Waits cut short by the bus closing
    pub total_channel_closed: AtomicU64,
}

impl LifecycleStats {
    /// Waits started but not yet settled.
    pub fn in_flight(&self) -> u64 {
        let settled = self.total_completed.load(Ordering::Relaxed)
            + self.total_destroyed.load(Ordering::Relaxed)
            + self.total_superseded.load(Ordering::Relaxed)
            + self.total_timeouts.load(Ordering::Relaxed)
            + self.total_channel_closed.load(Ordering::Relaxed);
        self.total_started
            .load(Ordering::Relaxed)
            .saturating_sub(settled)
    }

    fn record(&self, outcome: &LifecycleResult<ResourceLoaded>) {
        let counter = match outcome {
            Ok(_) => &self.total_completed,
            Err(LifecycleError::Removed { .. }) => &self.total_destroyed,
            Err(LifecycleError::Replaced { .. }) => &self.total_superseded,
            Err(LifecycleError::TimedOut { .. }) => &self.total_timeouts,
            Err(LifecycleError::ChannelClosed { .. }) => &self.total_channel_closed,
            Err(LifecycleError::CreateFailed { .. } | LifecycleError::ReloadFailed { .. }) => {
                &self.total_primitive_failures
            }
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Lifecycle Service
pub struct LifecycleService<H: ResourceHost> {
    config: LifecycleConfig,
    bus: Arc<InMemoryEventBus>,
    host: Arc<H>,
    stats: LifecycleStats,
}

impl<H: ResourceHost> LifecycleService<H> {
    pub fn new(config: LifecycleConfig, bus: Arc<InMemoryEventBus>, host: Arc<H>) -> Self {
        Self {
            config,
            bus,
            host,
            stats: LifecycleStats::default(),
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Statistics
    pub fn stats(&self) -> &LifecycleStats {
        &self.stats
    }

    #[instrument(skip_all, fields(url = ?props.url))]
    async fn create(
        &self,
        props: CreateProperties,
        timeout: Option<Duration>,
    ) -> LifecycleResult<ResourceLoaded> {
        let timeout = self.config.resolve_timeout(timeout);
        let armed = LifecycleWaiter::arm(&self.bus);

        let created = match self.host.create_resource(props).await {
            Ok(created) => created,
            Err(source) => {
                drop(armed);
                warn!(error = %source, "Resource creation failed");
                let err = Err(LifecycleError::CreateFailed { source });
                self.stats.record(&err);
                return err;
            }
        };

        self.stats.total_started.fetch_add(1, Ordering::Relaxed);
        info!(resource = %created.id, "Resource created, waiting for completion");

        // The host may hand back a resource that is already loaded
        if created.status.is_terminal() {
            drop(armed);
            let loaded = Ok(ResourceLoaded {
                id: created.id,
                status: created.status,
                resource: created,
            });
            self.stats.record(&loaded);
            return loaded;
        }

        self.settle(armed, created.id, timeout).await
    }

    #[instrument(skip_all, fields(resource = %id))]
    async fn reload(
        &self,
        id: ResourceId,
        props: ReloadProperties,
        timeout: Option<Duration>,
    ) -> LifecycleResult<ResourceLoaded> {
        let timeout = self.config.resolve_timeout(timeout);
        let armed = LifecycleWaiter::arm(&self.bus);

        if let Err(source) = self.host.reload_resource(id, props).await {
            drop(armed);
            warn!(error = %source, "Resource reload failed");
            let err = Err(LifecycleError::ReloadFailed { id, source });
            self.stats.record(&err);
            return err;
        }

        self.stats.total_started.fetch_add(1, Ordering::Relaxed);
        info!("Reload accepted, waiting for completion");

        self.settle(armed, id, timeout).await
    }

    async fn settle(
        &self,
        armed: ArmedWait,
        id: ResourceId,
        timeout: Duration,
    ) -> LifecycleResult<ResourceLoaded> {
        let outcome = armed.wait_for(id, timeout).await;
        self.stats.record(&outcome);
        outcome
    }
}

#[async_trait]
impl<H: ResourceHost + 'static> LifecycleApi for LifecycleService<H> {
    async fn create_and_wait(
        &self,
        props: CreateProperties,
        timeout: Option<Duration>,
    ) -> LifecycleResult<ResourceLoaded> {
        self.create(props, timeout).await
    }

    async fn reload_and_wait(
        &self,
        id: ResourceId,
        props: Option<ReloadProperties>,
        timeout: Option<Duration>,
    ) -> LifecycleResult<ResourceLoaded> {
        self.reload(id, props.unwrap_or_default(), timeout).await
    }
}
