use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use super::{absent_ok, found};
use crate::drift;
use crate::error::Result;
use crate::traits::{
    CreateDbSubnetGroupInput, DbSubnetGroup, ModifyDbSubnetGroupInput, RdsApi, ResourceAdapter,
};
use crate::types::{ResolvedAttributes, ResourceKind, SubnetGroupSpec};

/// Adapter for DB subnet groups
///
/// Subnet groups have no readiness of their own; updates replace the
/// description and member list directly.
pub struct SubnetGroupAdapter {
    api: Arc<dyn RdsApi>,
}

impl SubnetGroupAdapter {
    pub fn new(api: Arc<dyn RdsApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ResourceAdapter for SubnetGroupAdapter {
    type Spec = SubnetGroupSpec;
    type Resource = DbSubnetGroup;

    fn kind(&self) -> ResourceKind {
        ResourceKind::SubnetGroup
    }

    fn identifier<'a>(&self, spec: &'a SubnetGroupSpec) -> &'a str {
        &spec.name
    }

    async fn find_existing(&self, identifier: &str) -> Result<Option<DbSubnetGroup>> {
        found(self.api.describe_db_subnet_group(identifier).await)
    }

    async fn create(&self, spec: &SubnetGroupSpec) -> Result<DbSubnetGroup> {
        info!("Creating db subnet group {}", spec.name);
        self.api
            .create_db_subnet_group(CreateDbSubnetGroupInput::from(spec))
            .await
    }

    async fn apply_desired(&self, existing: &DbSubnetGroup, spec: &SubnetGroupSpec) -> Result<()> {
        if self.validate(existing, spec).is_empty() {
            debug!("db subnet group {} is up to date", spec.name);
            return Ok(());
        }

        info!("Updating db subnet group {}", spec.name);
        self.api
            .modify_db_subnet_group(ModifyDbSubnetGroupInput::from(spec))
            .await?;
        Ok(())
    }

    async fn delete(&self, identifier: &str) -> Result<()> {
        info!("Deleting db subnet group {}", identifier);
        absent_ok(self.api.delete_db_subnet_group(identifier).await)
    }

    fn is_ready(&self, _existing: &DbSubnetGroup) -> bool {
        true
    }

    fn validate(&self, existing: &DbSubnetGroup, spec: &SubnetGroupSpec) -> Vec<String> {
        drift::subnet_group(existing, spec)
    }

    fn resolve(&self, existing: &DbSubnetGroup) -> ResolvedAttributes {
        ResolvedAttributes {
            identifier: Some(existing.name.clone()),
            ..Default::default()
        }
    }
}
