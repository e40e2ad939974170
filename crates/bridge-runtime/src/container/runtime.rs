//! Runtime wiring: one bus, one host, two services.

use crate::adapters::SimulatedHost;
use crate::container::config::{BridgeConfig, ConfigError};
use bridge_telemetry::log_event;
use rc_01_remote_execution::{
    ExecutionResult, RemoteCall, RemoteExecutionApi, RemoteExecutionService, ScriptInjector,
};
use rc_02_lifecycle_wait::{
    LifecycleApi, LifecycleResult, LifecycleService, ResourceHost, ResourceLoaded,
};
use serde::de::DeserializeOwned;
use shared_bus::InMemoryEventBus;
use shared_types::{CreateProperties, ExecutionTarget, ReloadProperties, ResourceId};
use std::sync::Arc;
use std::time::Duration;

const COMPONENT: &str = "runtime";

/// The bridge with all parts wired to host `H`.
pub struct BridgeRuntime<H>
where
    H: ScriptInjector + ResourceHost + 'static,
{
    config: BridgeConfig,
    bus: Arc<InMemoryEventBus>,
    host: Arc<H>,
    execution: RemoteExecutionService<H>,
    lifecycle: LifecycleService<H>,
}

impl<H> BridgeRuntime<H>
where
    H: ScriptInjector + ResourceHost + 'static,
{
    /// Wire `host` to `bus`. The host must publish its events on `bus`.
    pub fn new(
        config: BridgeConfig,
        bus: Arc<InMemoryEventBus>,
        host: Arc<H>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let execution =
            RemoteExecutionService::new(config.execution.clone(), bus.clone(), host.clone());
        let lifecycle = LifecycleService::new(config.lifecycle.clone(), bus.clone(), host.clone());

        log_event!(
            info,
            COMPONENT,
            "Bridge runtime ready",
            execution_timeout_ms = config.execution.default_timeout_ms,
            lifecycle_timeout_ms = config.lifecycle.default_timeout_ms,
            bus_capacity = bus.capacity()
        );

        Ok(Self {
            config,
            bus,
            host,
            execution,
            lifecycle,
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn bus(&self) -> &Arc<InMemoryEventBus> {
        &self.bus
    }

    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    /// Remote execution service
    pub fn execution(&self) -> &RemoteExecutionService<H> {
        &self.execution
    }

    /// Lifecycle wait service
    pub fn lifecycle(&self) -> &LifecycleService<H> {
        &self.lifecycle
    }

    /// See [`RemoteExecutionApi::execute_remote`].
    pub async fn execute_remote(
        &self,
        target: ExecutionTarget,
        call: RemoteCall,
    ) -> ExecutionResult<serde_json::Value> {
        self.execution.execute_remote(target, call).await
    }

    /// Run `call` and decode its value as `T`.
    pub async fn execute_remote_as<T: DeserializeOwned>(
        &self,
        target: ExecutionTarget,
        call: RemoteCall,
    ) -> ExecutionResult<T> {
        self.execution.execute_remote_as(target, call).await
    }

    /// See [`LifecycleApi::create_and_wait`].
    pub async fn create_and_wait(
        &self,
        props: CreateProperties,
        timeout: Option<Duration>,
    ) -> LifecycleResult<ResourceLoaded> {
        self.lifecycle.create_and_wait(props, timeout).await
    }

    /// See [`LifecycleApi::reload_and_wait`].
    pub async fn reload_and_wait(
        &self,
        id: ResourceId,
        props: Option<ReloadProperties>,
        timeout: Option<Duration>,
    ) -> LifecycleResult<ResourceLoaded> {
        self.lifecycle.reload_and_wait(id, props, timeout).await
    }
}

impl BridgeRuntime<SimulatedHost> {
    /// Runtime over a fresh bus and a [`SimulatedHost`] publishing on it.
    pub fn simulated(config: BridgeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let bus = Arc::new(InMemoryEventBus::with_capacity(config.bus_capacity));
        let host = Arc::new(SimulatedHost::new(bus.clone()));
        Self::new(config, bus, host)
    }
}
