//! Driven Ports (SPI - Outbound Dependencies)

use crate::domain::payload::InjectionPayload;
use async_trait::async_trait;
use shared_types::{ExecutionTarget, HostResult};

/// The host's script-injection primitive.
///
/// Resolves once the payload has been injected. It says nothing about what
/// the injected code then does; that comes back over the broadcast channel.
#[async_trait]
pub trait ScriptInjector: Send + Sync {
    /// Inject `payload` into `target`.
    async fn inject(&self, target: ExecutionTarget, payload: &InjectionPayload) -> HostResult<()>;
}
