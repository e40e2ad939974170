//! Domain types for Lifecycle Wait.

pub mod state;

pub use state::{LifecycleSignal, WaitState};

use serde::{Deserialize, Serialize};
use shared_types::{ResourceId, ResourceInfo, ResourceStatus};

/// Result of a successful wait: the resource reached its terminal status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLoaded {
    /// The awaited resource
    pub id: ResourceId,
    /// The terminal status marker that ended the wait
    pub status: ResourceStatus,
    /// Snapshot carried by that progression event
    pub resource: ResourceInfo,
}
