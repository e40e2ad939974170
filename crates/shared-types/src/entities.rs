//! # Core Domain Entities
//!
//! Identifiers for execution targets and hosted resources, plus the
//! property records passed to the host's creation and reload primitives.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an execution context that can receive injected code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionTarget(pub u64);

impl fmt::Display for ExecutionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "target:{}", self.0)
    }
}

/// Identifier of a hosted page-like resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(pub u64);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "resource:{}", self.0)
    }
}

/// Load status marker carried by progression events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    /// Still loading.
    #[default]
    Loading,
    /// Finished loading; the terminal marker.
    Complete,
    /// Any marker this crate does not know about.
    #[serde(other)]
    Unknown,
}

impl ResourceStatus {
    /// Whether this marker ends a lifecycle wait.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Loading => "loading",
            Self::Complete => "complete",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Snapshot of a hosted resource as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceInfo {
    /// The resource identifier.
    pub id: ResourceId,
    /// Address the resource is showing, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Human readable title, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Current load status.
    pub status: ResourceStatus,
}

impl ResourceInfo {
    /// A freshly created resource that has not started loading yet.
    #[must_use]
    pub fn new(id: ResourceId) -> Self {
        Self {
            id,
            url: None,
            title: None,
            status: ResourceStatus::Loading,
        }
    }

    /// Same snapshot with a different status.
    #[must_use]
    pub fn with_status(mut self, status: ResourceStatus) -> Self {
        self.status = status;
        self
    }
}

/// Properties handed to the host's creation primitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CreateProperties {
    /// Initial address to load.
    pub url: Option<String>,
    /// Whether the new resource should become the active one.
    pub active: bool,
}

impl CreateProperties {
    /// Create properties for loading `url`.
    #[must_use]
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            active: true,
        }
    }
}

/// Properties handed to the host's reload primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ReloadProperties {
    /// Skip any host-side cache when reloading.
    pub bypass_cache: bool,
}
