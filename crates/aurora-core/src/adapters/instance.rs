use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use super::{absent_ok, found};
use crate::drift;
use crate::error::Result;
use crate::traits::{
    CreateDbInstanceInput, DbInstance, DeleteDbInstanceInput, ModifyDbInstanceInput, RdsApi,
    ResourceAdapter, STATUS_AVAILABLE,
};
use crate::types::{InstanceSpec, ResolvedAttributes, ResourceKind};

/// Adapter for DB instances that belong to a cluster
pub struct InstanceAdapter {
    api: Arc<dyn RdsApi>,
}

impl InstanceAdapter {
    pub fn new(api: Arc<dyn RdsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ResourceAdapter for InstanceAdapter {
    type Spec = InstanceSpec;
    type Resource = DbInstance;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Instance
    }

    fn identifier<'a>(&self, spec: &'a InstanceSpec) -> &'a str {
        &spec.id
    }

    async fn find_existing(&self, identifier: &str) -> Result<Option<DbInstance>> {
        found(self.api.describe_db_instance(identifier).await)
    }

    async fn create(&self, spec: &InstanceSpec) -> Result<DbInstance> {
        info!("Creating db instance {} in cluster {}", spec.id, spec.cluster_id);
        self.api
            .create_db_instance(CreateDbInstanceInput::from(spec))
            .await
    }

    async fn apply_desired(&self, existing: &DbInstance, spec: &InstanceSpec) -> Result<()> {
        let changes = ModifyDbInstanceInput {
            identifier: spec.id.clone(),
            instance_class: Some(spec.instance_class.clone())
                .filter(|class| *class != existing.instance_class),
            db_parameter_group_name: spec
                .parameter_group_name
                .clone()
                .filter(|g| existing.db_parameter_group.as_ref() != Some(g)),
            apply_immediately: true,
        };

        if changes.is_empty() {
            debug!("db instance {} is up to date", spec.id);
            return Ok(());
        }

        info!(?changes, "Modifying db instance {}", spec.id);
        self.api.modify_db_instance(changes).await?;
        Ok(())
    }

    async fn delete(&self, identifier: &str) -> Result<()> {
        info!("Deleting db instance {}", identifier);
        absent_ok(
            self.api
                .delete_db_instance(DeleteDbInstanceInput {
                    identifier: identifier.to_string(),
                    skip_final_snapshot: true,
                })
                .await,
        )
    }

    fn is_ready(&self, existing: &DbInstance) -> bool {
        existing.status == STATUS_AVAILABLE
    }

    fn validate(&self, existing: &DbInstance, spec: &InstanceSpec) -> Vec<String> {
        drift::instance(existing, spec)
    }

    fn resolve(&self, existing: &DbInstance) -> ResolvedAttributes {
        ResolvedAttributes {
            identifier: Some(existing.identifier.clone()),
            cluster_identifier: Some(existing.cluster_identifier.clone()),
            endpoint: existing.endpoint.clone(),
            reader_endpoint: None,
        }
    }
}
