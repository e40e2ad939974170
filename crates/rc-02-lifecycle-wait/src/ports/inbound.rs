//! Driving Ports (API - Inbound)

use crate::domain::ResourceLoaded;
use crate::error::LifecycleResult;
use async_trait::async_trait;
use shared_types::{CreateProperties, ReloadProperties, ResourceId};
use std::time::Duration;

/// Primary Lifecycle Wait API
#[async_trait]
pub trait LifecycleApi: Send + Sync {
    /// Create a resource and wait for it to finish loading.
    ///
    /// # Errors
    /// * `CreateFailed` if the host refuses; no wait is started
    /// * `Removed` / `Replaced` if the new resource goes away first
    /// * `TimedOut` when it does not complete in time
    async fn create_and_wait(
        &self,
        props: CreateProperties,
        timeout: Option<Duration>,
    ) -> LifecycleResult<ResourceLoaded>;

    /// Reload `id` and wait for it to finish loading again.
    ///
    /// `None` properties reload with the host defaults.
    async fn reload_and_wait(
        &self,
        id: ResourceId,
        props: Option<ReloadProperties>,
        timeout: Option<Duration>,
    ) -> LifecycleResult<ResourceLoaded>;
}
