//! Remote Execution Service - the public face of the subsystem.
//!
//! Validates and renders the call, mints its token, then hands the payload
//! to the [`RaceCoordinator`].

use crate::config::ExecutionConfig;
use crate::coordinator::{ExecutionStats, RaceCoordinator};
use crate::domain::correlation::CorrelationToken;
use crate::domain::payload::{EncodedArg, PayloadTemplate};
use crate::domain::work::UnitOfWork;
use crate::error::{ExecutionError, ExecutionResult};
use crate::ports::inbound::RemoteExecutionApi;
use crate::ports::outbound::ScriptInjector;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_bus::InMemoryEventBus;
use shared_types::ExecutionTarget;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// One remote invocation: the work, its arguments and an optional bound.
#[derive(Debug, Clone)]
pub struct RemoteCall {
    work: UnitOfWork,
    args: Vec<EncodedArg>,
    timeout: Option<Duration>,
}

impl RemoteCall {
    /// Call `work` with no arguments and the default timeout.
    pub fn new(work: impl Into<UnitOfWork>) -> Self {
        Self {
            work: work.into(),
            args: Vec::new(),
            timeout: None,
        }
    }

    /// Call a dynamically shaped unit of work.
    pub fn from_value(work: serde_json::Value) -> ExecutionResult<Self> {
        UnitOfWork::try_from(work).map(Self::new)
    }

    /// Append an argument, encoding it now.
    pub fn arg<T: Serialize + ?Sized>(mut self, value: &T) -> ExecutionResult<Self> {
        let encoded = EncodedArg::encode(self.args.len(), value)?;
        self.args.push(encoded);
        Ok(self)
    }

    /// Bound the call. Zero means "use the default".
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The unit of work.
    pub fn work(&self) -> &UnitOfWork {
        &self.work
    }

    /// Number of arguments.
    pub fn arg_count(&self) -> usize {
        self.args.len()
    }
}

/// Remote Execution Service
pub struct RemoteExecutionService<I: ScriptInjector> {
    config: ExecutionConfig,
    template: PayloadTemplate,
    coordinator: RaceCoordinator<I>,
}

impl<I: ScriptInjector> RemoteExecutionService<I> {
    pub fn new(config: ExecutionConfig, bus: Arc<InMemoryEventBus>, injector: Arc<I>) -> Self {
        let template = PayloadTemplate::new(config.broadcast_function.clone());
        Self {
            config,
            template,
            coordinator: RaceCoordinator::new(injector, bus),
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    /// Statistics
    pub fn stats(&self) -> &ExecutionStats {
        self.coordinator.stats()
    }

    /// Run the call and decode the resolved value as `T`.
    pub async fn execute_remote_as<T: DeserializeOwned>(
        &self,
        target: ExecutionTarget,
        call: RemoteCall,
    ) -> ExecutionResult<T> {
        let value = self.run(target, call).await?;
        serde_json::from_value(value).map_err(|e| ExecutionError::ResultDecoding {
            reason: e.to_string(),
        })
    }

    #[instrument(skip_all, fields(target = %target))]
    async fn run(
        &self,
        target: ExecutionTarget,
        call: RemoteCall,
    ) -> ExecutionResult<serde_json::Value> {
        let timeout = self.config.resolve_timeout(call.timeout);
        let token = CorrelationToken::new();

        let payload = match self.template.render(&call.work, &token, &call.args) {
            Ok(payload) => payload,
            Err(e) => {
                self.stats().total_rejected.fetch_add(1, Ordering::Relaxed);
                debug!(error = %e, "Remote call rejected before injection");
                return Err(e);
            }
        };

        info!(
            token = %token,
            args = call.args.len(),
            timeout_ms = timeout.as_millis() as u64,
            "Dispatching remote call"
        );

        let content = self
            .coordinator
            .execute(target, payload, token, timeout)
            .await?;
        Ok(content.unwrap_or(serde_json::Value::Null))
    }
}

#[async_trait]
impl<I: ScriptInjector + 'static> RemoteExecutionApi for RemoteExecutionService<I> {
    async fn execute_remote(
        &self,
        target: ExecutionTarget,
        call: RemoteCall,
    ) -> ExecutionResult<serde_json::Value> {
        self.run(target, call).await
    }
}
