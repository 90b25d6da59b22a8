// # Desired Specs
//
// User-declared target configuration, one struct per resource kind.
//
// Specs are never mutated by the reconciler. References to companion
// resources (subnet group, parameter groups, the owning cluster) are what the
// deletion guard scans when a deletion request is reconciled.
//
// ## Example manifest (JSON)
//
// ```json
// {
//   "kind": "cluster",
//   "spec": {
//     "id": "db1",
//     "engine": "aurora-postgresql",
//     "engine_version": "15.4",
//     "master_username": "admin",
//     "master_user_password": "...",
//     "security_group_ids": ["sg-1", "sg-2"],
//     "subnet_group_name": "private",
//     "parameter_group_name": "pg15-cluster"
//   }
// }
// ```

use serde::{Deserialize, Serialize};
use std::fmt;

use super::object::{ObjectKind, ResourceKind};

/// Desired state of an Aurora DB cluster
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSpec {
    /// Cluster identifier
    pub id: String,
    /// Database engine (e.g. "aurora-postgresql")
    pub engine: String,
    /// Engine version; provider default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_version: Option<String>,
    /// Master user name
    #[serde(default)]
    pub master_username: String,
    /// Master user password
    /// ⚠️ NEVER log this value
    #[serde(default)]
    pub master_user_password: String,
    /// VPC security group ids
    #[serde(default)]
    pub security_group_ids: Vec<String>,
    /// DB subnet group the cluster is placed in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_group_name: Option<String>,
    /// DB cluster parameter group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_group_name: Option<String>,
}

// Custom Debug implementation that hides the master password
impl fmt::Debug for ClusterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterSpec")
            .field("id", &self.id)
            .field("engine", &self.engine)
            .field("engine_version", &self.engine_version)
            .field("master_username", &self.master_username)
            .field("master_user_password", &"<REDACTED>")
            .field("security_group_ids", &self.security_group_ids)
            .field("subnet_group_name", &self.subnet_group_name)
            .field("parameter_group_name", &self.parameter_group_name)
            .finish()
    }
}

/// Desired state of a DB instance that belongs to a cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSpec {
    /// Instance identifier
    pub id: String,
    /// Identifier of the owning cluster
    pub cluster_id: String,
    /// Database engine, must match the cluster's
    pub engine: String,
    /// Instance class (e.g. "db.r6g.large")
    pub instance_class: String,
    /// Allocated storage in GiB (ignored by Aurora storage, kept for parity)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocated_storage: Option<u32>,
    /// DB parameter group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_group_name: Option<String>,
}

/// A single engine parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

impl Parameter {
    /// Create a new parameter
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Desired state of a DB parameter group or DB cluster parameter group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterGroupSpec {
    /// Group name
    pub name: String,
    /// Parameter group family (e.g. "aurora-postgresql15")
    pub family: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Parameters to set on the group
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

/// Desired state of a DB subnet group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetGroupSpec {
    /// Group name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Member subnet ids
    pub subnet_ids: Vec<String>,
}

/// Request to delete a provider-side resource
///
/// Declaring one of these is the only way the reconciler ever deletes
/// something at the provider. It is blocked while the resource is still
/// declared or referenced by a dependent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionSpec {
    /// Kind of the resource to delete
    pub kind: ResourceKind,
    /// Provider identifier (or name, for groups) of the resource
    pub identifier: String,
}

/// Desired spec of one declared object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "spec", rename_all = "snake_case")]
pub enum Manifest {
    Cluster(ClusterSpec),
    Instance(InstanceSpec),
    ParameterGroup(ParameterGroupSpec),
    ClusterParameterGroup(ParameterGroupSpec),
    SubnetGroup(SubnetGroupSpec),
    Deletion(DeletionSpec),
}

impl Manifest {
    /// The declared-object kind of this manifest
    pub fn kind(&self) -> ObjectKind {
        match self {
            Manifest::Cluster(_) => ObjectKind::Cluster,
            Manifest::Instance(_) => ObjectKind::Instance,
            Manifest::ParameterGroup(_) => ObjectKind::ParameterGroup,
            Manifest::ClusterParameterGroup(_) => ObjectKind::ClusterParameterGroup,
            Manifest::SubnetGroup(_) => ObjectKind::SubnetGroup,
            Manifest::Deletion(_) => ObjectKind::Deletion,
        }
    }

    /// The provider resource this manifest manages, if it is a lifecycle object
    pub fn managed_resource(&self) -> Option<(ResourceKind, &str)> {
        match self {
            Manifest::Cluster(spec) => Some((ResourceKind::Cluster, spec.id.as_str())),
            Manifest::Instance(spec) => Some((ResourceKind::Instance, spec.id.as_str())),
            Manifest::ParameterGroup(spec) => {
                Some((ResourceKind::ParameterGroup, spec.name.as_str()))
            }
            Manifest::ClusterParameterGroup(spec) => {
                Some((ResourceKind::ClusterParameterGroup, spec.name.as_str()))
            }
            Manifest::SubnetGroup(spec) => Some((ResourceKind::SubnetGroup, spec.name.as_str())),
            Manifest::Deletion(_) => None,
        }
    }

    /// Provider resources this manifest's spec depends on
    ///
    /// - instance → cluster, parameter group
    /// - cluster → cluster parameter group, subnet group
    pub fn references(&self) -> Vec<(ResourceKind, &str)> {
        let mut refs = Vec::new();
        match self {
            Manifest::Instance(spec) => {
                refs.push((ResourceKind::Cluster, spec.cluster_id.as_str()));
                if let Some(group) = spec.parameter_group_name.as_deref() {
                    refs.push((ResourceKind::ParameterGroup, group));
                }
            }
            Manifest::Cluster(spec) => {
                if let Some(group) = spec.parameter_group_name.as_deref() {
                    refs.push((ResourceKind::ClusterParameterGroup, group));
                }
                if let Some(group) = spec.subnet_group_name.as_deref() {
                    refs.push((ResourceKind::SubnetGroup, group));
                }
            }
            _ => {}
        }
        refs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster() -> ClusterSpec {
        ClusterSpec {
            id: "db1".to_string(),
            engine: "aurora-postgresql".to_string(),
            engine_version: None,
            master_username: "admin".to_string(),
            master_user_password: "hunter22".to_string(),
            security_group_ids: vec!["sg-1".to_string()],
            subnet_group_name: Some("private".to_string()),
            parameter_group_name: None,
        }
    }

    #[test]
    fn debug_redacts_password() {
        let rendered = format!("{:?}", cluster());
        assert!(!rendered.contains("hunter22"));
        assert!(rendered.contains("<REDACTED>"));
    }

    #[test]
    fn manifest_uses_kind_and_spec_tags() {
        let json = serde_json::json!({
            "kind": "deletion",
            "spec": { "kind": "cluster", "identifier": "db1" }
        });
        let manifest: Manifest = serde_json::from_value(json).unwrap();
        assert_eq!(manifest.kind(), ObjectKind::Deletion);
        assert!(manifest.managed_resource().is_none());
    }

    #[test]
    fn cluster_references_only_declared_groups() {
        let manifest = Manifest::Cluster(cluster());
        assert_eq!(
            manifest.references(),
            vec![(ResourceKind::SubnetGroup, "private")]
        );
    }

    #[test]
    fn instance_references_its_cluster() {
        let manifest = Manifest::Instance(InstanceSpec {
            id: "db1-a".to_string(),
            cluster_id: "db1".to_string(),
            engine: "aurora-postgresql".to_string(),
            instance_class: "db.r6g.large".to_string(),
            allocated_storage: None,
            parameter_group_name: Some("pg15".to_string()),
        });
        assert_eq!(
            manifest.references(),
            vec![
                (ResourceKind::Cluster, "db1"),
                (ResourceKind::ParameterGroup, "pg15")
            ]
        );
        assert_eq!(
            manifest.managed_resource(),
            Some((ResourceKind::Instance, "db1-a"))
        );
    }
}
