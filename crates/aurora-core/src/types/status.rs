//! Observed status of declared objects
//!
//! Lifecycle objects move through `"" → unprovisioned → provisioning →
//! provisioned` (with regression to `unprovisioned` on drift); deletion
//! requests move linearly through `"" → created → executing → completed`.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::object::ObjectKind;

/// State of a lifecycle object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    /// Never reconciled
    #[default]
    #[serde(rename = "")]
    NoState,
    Unprovisioned,
    Provisioning,
    Provisioned,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::NoState => "",
            LifecycleState::Unprovisioned => "unprovisioned",
            LifecycleState::Provisioning => "provisioning",
            LifecycleState::Provisioned => "provisioned",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a deletion request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletionState {
    /// Never reconciled
    #[default]
    #[serde(rename = "")]
    NoState,
    Created,
    Executing,
    Completed,
}

impl DeletionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeletionState::NoState => "",
            DeletionState::Created => "created",
            DeletionState::Executing => "executing",
            DeletionState::Completed => "completed",
        }
    }
}

impl fmt::Display for DeletionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attributes copied from the provider's description of a provisioned resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAttributes {
    /// Provider-assigned identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    /// Owning cluster (instances only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_identifier: Option<String>,
    /// Writer / instance endpoint address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Reader endpoint address (clusters only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reader_endpoint: Option<String>,
}

impl ResolvedAttributes {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Observed status of a lifecycle object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleStatus {
    #[serde(default)]
    pub state: LifecycleState,
    /// Unix milliseconds since which the resource has been continuously
    /// ready; `0` when it was not ready at the last probe
    #[serde(default)]
    pub ready_since: i64,
    #[serde(default, skip_serializing_if = "ResolvedAttributes::is_empty")]
    pub resolved: ResolvedAttributes,
}

/// Observed status of a deletion request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionStatus {
    #[serde(default)]
    pub state: DeletionState,
}

/// Observed status of any declared object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "flavor", rename_all = "snake_case")]
pub enum ObjectStatus {
    Lifecycle(LifecycleStatus),
    Deletion(DeletionStatus),
}

impl ObjectStatus {
    /// Empty status for a newly declared object of `kind`
    pub fn initial_for(kind: ObjectKind) -> Self {
        if kind.is_lifecycle() {
            ObjectStatus::Lifecycle(LifecycleStatus::default())
        } else {
            ObjectStatus::Deletion(DeletionStatus::default())
        }
    }

    /// State name, for logs and events
    pub fn state_name(&self) -> &'static str {
        match self {
            ObjectStatus::Lifecycle(status) => status.state.as_str(),
            ObjectStatus::Deletion(status) => status.state.as_str(),
        }
    }
}
