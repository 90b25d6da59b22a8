use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{absent_ok, found};
use crate::drift;
use crate::error::Result;
use crate::traits::{
    CreateDbClusterInput, DbCluster, DeleteDbClusterInput, ModifyDbClusterInput, RdsApi,
    ResourceAdapter, STATUS_AVAILABLE,
};
use crate::types::{ClusterSpec, ResolvedAttributes, ResourceKind};

/// Adapter for Aurora DB clusters
pub struct ClusterAdapter {
    api: Arc<dyn RdsApi>,
}

impl ClusterAdapter {
    pub fn new(api: Arc<dyn RdsApi>) -> Self {
        Self { api }
    }

    /// Fields of `spec` the cluster does not reflect and that can change live
    fn pending_changes(existing: &DbCluster, spec: &ClusterSpec) -> ModifyDbClusterInput {
        let engine_version = spec
            .engine_version
            .clone()
            .filter(|v| *v != existing.engine_version);

        let desired: BTreeSet<&String> = spec.security_group_ids.iter().collect();
        let actual: BTreeSet<&String> = existing.vpc_security_group_ids.iter().collect();
        let vpc_security_group_ids =
            (desired != actual).then(|| spec.security_group_ids.clone());

        let db_cluster_parameter_group_name = spec
            .parameter_group_name
            .clone()
            .filter(|g| existing.db_cluster_parameter_group.as_ref() != Some(g));

        ModifyDbClusterInput {
            identifier: spec.id.clone(),
            engine_version,
            vpc_security_group_ids,
            db_cluster_parameter_group_name,
            apply_immediately: true,
        }
    }
}

#[async_trait]
impl ResourceAdapter for ClusterAdapter {
    type Spec = ClusterSpec;
    type Resource = DbCluster;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Cluster
    }

    fn identifier<'a>(&self, spec: &'a ClusterSpec) -> &'a str {
        &spec.id
    }

    async fn find_existing(&self, identifier: &str) -> Result<Option<DbCluster>> {
        found(self.api.describe_db_cluster(identifier).await)
    }

    async fn create(&self, spec: &ClusterSpec) -> Result<DbCluster> {
        info!("Creating db cluster {}", spec.id);
        self.api
            .create_db_cluster(CreateDbClusterInput::from(spec))
            .await
    }

    async fn apply_desired(&self, existing: &DbCluster, spec: &ClusterSpec) -> Result<()> {
        if let Some(wanted) = &spec.subnet_group_name {
            if existing.db_subnet_group.as_ref() != Some(wanted) {
                warn!(
                    "db cluster {} subnet group cannot be changed in place ({:?} -> {})",
                    spec.id, existing.db_subnet_group, wanted
                );
            }
        }

        let changes = Self::pending_changes(existing, spec);
        if changes.is_empty() {
            debug!("db cluster {} is up to date", spec.id);
            return Ok(());
        }

        info!(?changes, "Modifying db cluster {}", spec.id);
        self.api.modify_db_cluster(changes).await?;
        Ok(())
    }

    async fn delete(&self, identifier: &str) -> Result<()> {
        info!("Deleting db cluster {}", identifier);
        absent_ok(
            self.api
                .delete_db_cluster(DeleteDbClusterInput {
                    identifier: identifier.to_string(),
                    skip_final_snapshot: true,
                })
                .await,
        )
    }

    fn is_ready(&self, existing: &DbCluster) -> bool {
        existing.status == STATUS_AVAILABLE
    }

    fn validate(&self, existing: &DbCluster, spec: &ClusterSpec) -> Vec<String> {
        drift::cluster(existing, spec)
    }

    fn resolve(&self, existing: &DbCluster) -> ResolvedAttributes {
        ResolvedAttributes {
            identifier: Some(existing.identifier.clone()),
            cluster_identifier: None,
            endpoint: existing.endpoint.clone(),
            reader_endpoint: existing.reader_endpoint.clone(),
        }
    }
}
