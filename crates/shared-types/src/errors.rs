//! # Error Types
//!
//! Errors reported by the host's external primitives.

use crate::entities::{ExecutionTarget, ResourceId};
use thiserror::Error;

/// Failure of an external host primitive (injection, creation, reload).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The execution target does not exist or cannot accept code.
    #[error("Invalid execution target: {0}")]
    InvalidTarget(ExecutionTarget),

    /// The resource is not known to the host.
    #[error("Unknown resource: {0}")]
    UnknownResource(ResourceId),

    /// The host refused the operation.
    #[error("{operation} rejected by host: {reason}")]
    Rejected { operation: String, reason: String },
}

impl HostError {
    /// Host refusal for `operation`.
    pub fn rejected(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for host primitives.
pub type HostResult<T> = Result<T, HostError>;
