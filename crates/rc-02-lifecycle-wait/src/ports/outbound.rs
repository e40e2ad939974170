//! Driven Ports (SPI - Outbound Dependencies)

use async_trait::async_trait;
use shared_types::{CreateProperties, HostResult, ReloadProperties, ResourceId, ResourceInfo};

/// The host's resource primitives.
///
/// Both resolve once the host has accepted the action. Progress is reported
/// separately, as lifecycle events on the bus.
#[async_trait]
pub trait ResourceHost: Send + Sync {
    /// Create a resource and return its initial snapshot.
    async fn create_resource(&self, props: CreateProperties) -> HostResult<ResourceInfo>;

    /// Start reloading an existing resource.
    async fn reload_resource(&self, id: ResourceId, props: ReloadProperties) -> HostResult<()>;
}
