use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{absent_ok, found};
use crate::drift;
use crate::error::Result;
use crate::traits::{
    ApplyMethod, CreateParameterGroupInput, DbParameterGroup, ModifyParameterGroupInput,
    ParameterChange, ParameterGroupScope, RdsApi, ResourceAdapter,
};
use crate::types::{ParameterGroupSpec, ResolvedAttributes, ResourceKind};

/// Adapter for DB parameter groups and DB cluster parameter groups
///
/// Both flavours share one spec and one request shape; only the scope sent
/// to the provider differs. Groups have no readiness of their own.
pub struct ParameterGroupAdapter {
    api: Arc<dyn RdsApi>,
    scope: ParameterGroupScope,
}

impl ParameterGroupAdapter {
    /// DB (instance-level) parameter group adapter
    pub fn new(api: Arc<dyn RdsApi>) -> Self {
        Self::with_scope(api, ParameterGroupScope::Instance)
    }

    /// DB cluster parameter group adapter
    pub fn cluster(api: Arc<dyn RdsApi>) -> Self {
        Self::with_scope(api, ParameterGroupScope::Cluster)
    }

    pub fn with_scope(api: Arc<dyn RdsApi>, scope: ParameterGroupScope) -> Self {
        Self { api, scope }
    }

    pub fn scope(&self) -> ParameterGroupScope {
        self.scope
    }

    /// Declared parameters whose provider value is missing or different
    fn pending_changes(existing: &DbParameterGroup, spec: &ParameterGroupSpec) -> Vec<ParameterChange> {
        spec.parameters
            .iter()
            .filter(|p| existing.parameters.get(&p.name) != Some(&p.value))
            .map(|p| ParameterChange {
                name: p.name.clone(),
                value: p.value.clone(),
                apply_method: ApplyMethod::Immediate,
            })
            .collect()
    }
}

#[async_trait]
impl ResourceAdapter for ParameterGroupAdapter {
    type Spec = ParameterGroupSpec;
    type Resource = DbParameterGroup;

    fn kind(&self) -> ResourceKind {
        match self.scope {
            ParameterGroupScope::Instance => ResourceKind::ParameterGroup,
            ParameterGroupScope::Cluster => ResourceKind::ClusterParameterGroup,
        }
    }

    fn identifier<'a>(&self, spec: &'a ParameterGroupSpec) -> &'a str {
        &spec.name
    }

    async fn find_existing(&self, identifier: &str) -> Result<Option<DbParameterGroup>> {
        found(self.api.describe_parameter_group(self.scope, identifier).await)
    }

    async fn create(&self, spec: &ParameterGroupSpec) -> Result<DbParameterGroup> {
        info!("Creating {} {}", self.scope.as_str(), spec.name);
        let group = self
            .api
            .create_parameter_group(self.scope, CreateParameterGroupInput::from(spec))
            .await?;

        // A fresh group carries only engine defaults
        self.apply_desired(&group, spec).await?;
        Ok(group)
    }

    async fn apply_desired(&self, existing: &DbParameterGroup, spec: &ParameterGroupSpec) -> Result<()> {
        if existing.family != spec.family || existing.description != spec.description {
            warn!(
                "{} {} family/description cannot be changed in place",
                self.scope.as_str(),
                spec.name
            );
        }

        let parameters = Self::pending_changes(existing, spec);
        if parameters.is_empty() {
            debug!("{} {} is up to date", self.scope.as_str(), spec.name);
            return Ok(());
        }

        info!(
            "Setting {} parameter(s) on {} {}",
            parameters.len(),
            self.scope.as_str(),
            spec.name
        );
        self.api
            .modify_parameter_group(
                self.scope,
                ModifyParameterGroupInput {
                    name: spec.name.clone(),
                    parameters,
                },
            )
            .await
    }

    async fn delete(&self, identifier: &str) -> Result<()> {
        info!("Deleting {} {}", self.scope.as_str(), identifier);
        absent_ok(self.api.delete_parameter_group(self.scope, identifier).await)
    }

    fn is_ready(&self, _existing: &DbParameterGroup) -> bool {
        true
    }

    fn validate(&self, existing: &DbParameterGroup, spec: &ParameterGroupSpec) -> Vec<String> {
        drift::parameter_group(existing, spec)
    }

    fn resolve(&self, existing: &DbParameterGroup) -> ResolvedAttributes {
        ResolvedAttributes {
            identifier: Some(existing.name.clone()),
            ..Default::default()
        }
    }
}
