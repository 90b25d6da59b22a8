//! Deletion guard
//!
//! Point-in-time check run before a deletion request issues its delete call.
//! A provider resource may only be deleted once
//!
//! 1. no declared lifecycle object manages it anymore, and
//! 2. no declared object's spec references it.
//!
//! The check holds no lock; it runs again on every redelivered pass.

use crate::error::{Error, Result};
use crate::types::{ResourceKind, StoredObject};

/// Why a deletion is blocked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Blocker {
    /// The resource is still declared by this object
    Declared(String),
    /// This object's spec references the resource
    Referenced(String),
}

impl std::fmt::Display for Blocker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Blocker::Declared(key) => write!(f, "still declared by {}", key),
            Blocker::Referenced(key) => write!(f, "referenced by {}", key),
        }
    }
}

/// Find everything that blocks deleting `identifier` of `kind`
pub fn blockers(kind: ResourceKind, identifier: &str, snapshot: &[StoredObject]) -> Vec<Blocker> {
    let target = (kind, identifier);
    let mut found = Vec::new();
    for object in snapshot {
        if object.manifest.managed_resource() == Some(target) {
            found.push(Blocker::Declared(object.key.to_string()));
        }
        if object.manifest.references().contains(&target) {
            found.push(Blocker::Referenced(object.key.to_string()));
        }
    }
    found
}

/// Fail with `Error::StillReferenced` if anything blocks the deletion
pub fn check(kind: ResourceKind, identifier: &str, snapshot: &[StoredObject]) -> Result<()> {
    let found = blockers(kind, identifier, snapshot);
    if found.is_empty() {
        return Ok(());
    }

    let reasons: Vec<String> = found.iter().map(ToString::to_string).collect();
    Err(Error::still_referenced(format!(
        "{} {} is {}",
        kind,
        identifier,
        reasons.join(", ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClusterSpec, DeletionSpec, InstanceSpec, Manifest};

    fn instance(name: &str, cluster_id: &str) -> StoredObject {
        StoredObject::declared(
            name,
            Manifest::Instance(InstanceSpec {
                id: name.to_string(),
                cluster_id: cluster_id.to_string(),
                engine: "aurora-postgresql".to_string(),
                instance_class: "db.r6g.large".to_string(),
                allocated_storage: None,
                parameter_group_name: None,
            }),
        )
    }

    fn cluster(id: &str, subnet_group: Option<&str>) -> StoredObject {
        StoredObject::declared(
            id,
            Manifest::Cluster(ClusterSpec {
                id: id.to_string(),
                engine: "aurora-postgresql".to_string(),
                engine_version: None,
                master_username: "admin".to_string(),
                master_user_password: "pw".to_string(),
                security_group_ids: vec![],
                subnet_group_name: subnet_group.map(str::to_string),
                parameter_group_name: None,
            }),
        )
    }

    #[test]
    fn instance_blocks_cluster_deletion() {
        let snapshot = vec![instance("db1-a", "db1")];
        let err = check(ResourceKind::Cluster, "db1", &snapshot).unwrap_err();
        assert!(err.is_blocked());
        assert!(err.to_string().contains("referenced by instance/db1-a"));
    }

    #[test]
    fn declared_object_blocks_its_own_resource() {
        let snapshot = vec![cluster("db1", None)];
        assert_eq!(
            blockers(ResourceKind::Cluster, "db1", &snapshot),
            vec![Blocker::Declared("cluster/db1".to_string())]
        );
    }

    #[test]
    fn cluster_blocks_subnet_group_deletion() {
        let snapshot = vec![cluster("db1", Some("private"))];
        assert!(check(ResourceKind::SubnetGroup, "private", &snapshot).is_err());
        assert!(check(ResourceKind::SubnetGroup, "public", &snapshot).is_ok());
    }

    #[test]
    fn same_name_of_other_kind_does_not_block() {
        let snapshot = vec![
            instance("db1", "other"),
            StoredObject::declared(
                "drop-db1",
                Manifest::Deletion(DeletionSpec {
                    kind: ResourceKind::Cluster,
                    identifier: "db1".to_string(),
                }),
            ),
        ];
        assert!(check(ResourceKind::Cluster, "db1", &snapshot).is_ok());
    }
}
