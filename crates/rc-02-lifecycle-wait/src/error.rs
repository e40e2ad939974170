//! Error types for the Lifecycle Wait subsystem

use shared_types::{HostError, ResourceId};
use thiserror::Error;

/// Lifecycle wait errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The creation primitive failed; no wait was started.
    #[error("Resource creation failed: {source}")]
    CreateFailed {
        #[source]
        source: HostError,
    },

    /// The reload primitive failed; no wait was started.
    #[error("Reload of {id} failed: {source}")]
    ReloadFailed {
        id: ResourceId,
        #[source]
        source: HostError,
    },

    /// The resource was destroyed while still loading.
    #[error("{id} was removed before completion")]
    Removed { id: ResourceId },

    /// The resource was superseded while still loading.
    #[error("{id} was replaced by {replacement} before completion")]
    Replaced {
        id: ResourceId,
        replacement: ResourceId,
    },

    /// The resource did not finish loading within the bound.
    #[error("{id} did not complete within {elapsed_ms} ms")]
    TimedOut { id: ResourceId, elapsed_ms: u64 },

    /// The bus shut down while the wait was pending.
    #[error("Lifecycle channel closed while waiting for {id}")]
    ChannelClosed { id: ResourceId },
}

impl LifecycleError {
    /// Whether the triggering primitive failed (before any wait).
    pub fn is_setup_error(&self) -> bool {
        matches!(self, Self::CreateFailed { .. } | Self::ReloadFailed { .. })
    }

    /// Whether the bound elapsed.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }

    /// The resource the error concerns, when one was known.
    pub fn resource_id(&self) -> Option<ResourceId> {
        match self {
            Self::CreateFailed { .. } => None,
            Self::ReloadFailed { id, .. }
            | Self::Removed { id }
            | Self::Replaced { id, .. }
            | Self::TimedOut { id, .. }
            | Self::ChannelClosed { id } => Some(*id),
        }
    }
}

/// Result type for lifecycle waits
pub type LifecycleResult<T> = Result<T, LifecycleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_condition() {
        let removed = LifecycleError::Removed { id: ResourceId(3) };
        assert_eq!(removed.to_string(), "resource:3 was removed before completion");

        let replaced = LifecycleError::Replaced {
            id: ResourceId(3),
            replacement: ResourceId(9),
        };
        assert!(replaced.to_string().contains("replaced"));
        assert!(replaced.to_string().contains("resource:9"));
    }

    #[test]
    fn test_timeout_names_duration() {
        let err = LifecycleError::TimedOut {
            id: ResourceId(1),
            elapsed_ms: 120_000,
        };
        assert!(err.to_string().contains("120000 ms"));
        assert!(err.is_timeout());
        assert!(!err.is_setup_error());
    }

    #[test]
    fn test_setup_errors() {
        let err = LifecycleError::CreateFailed {
            source: HostError::rejected("create", "quota exceeded"),
        };
        assert!(err.is_setup_error());
        assert_eq!(err.resource_id(), None);

        let err = LifecycleError::ReloadFailed {
            id: ResourceId(5),
            source: HostError::UnknownResource(ResourceId(5)),
        };
        assert!(err.is_setup_error());
        assert_eq!(err.resource_id(), Some(ResourceId(5)));
    }
}
