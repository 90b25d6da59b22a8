//! Object identity and the stored-object envelope

use serde::{Deserialize, Serialize};
use std::fmt;

use super::spec::Manifest;
use super::status::ObjectStatus;

/// Provider-side resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Aurora DB cluster
    Cluster,
    /// DB instance inside a cluster
    Instance,
    /// DB (instance-level) parameter group
    ParameterGroup,
    /// DB cluster parameter group
    ClusterParameterGroup,
    /// DB subnet group
    SubnetGroup,
}

impl ResourceKind {
    /// All resource kinds, in dependency order (dependents first)
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Instance,
        ResourceKind::Cluster,
        ResourceKind::ParameterGroup,
        ResourceKind::ClusterParameterGroup,
        ResourceKind::SubnetGroup,
    ];

    /// Stable name used in logs and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Cluster => "cluster",
            ResourceKind::Instance => "instance",
            ResourceKind::ParameterGroup => "parameter_group",
            ResourceKind::ClusterParameterGroup => "cluster_parameter_group",
            ResourceKind::SubnetGroup => "subnet_group",
        }
    }

    /// The declared-object kind that manages this resource kind
    pub fn object_kind(&self) -> ObjectKind {
        match self {
            ResourceKind::Cluster => ObjectKind::Cluster,
            ResourceKind::Instance => ObjectKind::Instance,
            ResourceKind::ParameterGroup => ObjectKind::ParameterGroup,
            ResourceKind::ClusterParameterGroup => ObjectKind::ClusterParameterGroup,
            ResourceKind::SubnetGroup => ObjectKind::SubnetGroup,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared-object kinds: one per resource kind plus deletion requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Cluster,
    Instance,
    ParameterGroup,
    ClusterParameterGroup,
    SubnetGroup,
    /// Request to delete a provider-side resource
    Deletion,
}

impl ObjectKind {
    /// Stable name used in logs and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Cluster => "cluster",
            ObjectKind::Instance => "instance",
            ObjectKind::ParameterGroup => "parameter_group",
            ObjectKind::ClusterParameterGroup => "cluster_parameter_group",
            ObjectKind::SubnetGroup => "subnet_group",
            ObjectKind::Deletion => "deletion",
        }
    }

    /// `true` for kinds driven by the lifecycle state machine
    pub fn is_lifecycle(&self) -> bool {
        !matches!(self, ObjectKind::Deletion)
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a declared object in the object store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectKey {
    /// Object kind
    pub kind: ObjectKind,
    /// Object name, unique per kind
    pub name: String,
}

impl ObjectKey {
    /// Create a new object key
    pub fn new(kind: ObjectKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

/// A declared object as held by the object store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredObject {
    /// Object identity
    pub key: ObjectKey,
    /// Bumped on every spec or status write; used for optimistic concurrency
    pub resource_version: u64,
    /// Desired spec
    pub manifest: Manifest,
    /// Observed status
    pub status: ObjectStatus,
}

impl StoredObject {
    /// Build a freshly declared object with an empty status
    pub fn declared(name: impl Into<String>, manifest: Manifest) -> Self {
        let key = ObjectKey::new(manifest.kind(), name);
        let status = ObjectStatus::initial_for(key.kind);
        Self {
            key,
            resource_version: 1,
            manifest,
            status,
        }
    }
}
