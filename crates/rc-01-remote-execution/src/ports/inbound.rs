//! Driving Ports (API - Inbound)

use crate::error::ExecutionResult;
use crate::service::RemoteCall;
use async_trait::async_trait;
use shared_types::ExecutionTarget;

/// Primary Remote Execution API
#[async_trait]
pub trait RemoteExecutionApi: Send + Sync {
    /// Run `call` inside `target` and return its resolved value.
    ///
    /// A unit of work that returns nothing resolves to `Value::Null`.
    ///
    /// # Errors
    /// * Setup errors for bad payloads or a failed injection
    /// * `Remote` when the work throws
    /// * `TimedOut` when no envelope arrives in time
    async fn execute_remote(
        &self,
        target: ExecutionTarget,
        call: RemoteCall,
    ) -> ExecutionResult<serde_json::Value>;
}
