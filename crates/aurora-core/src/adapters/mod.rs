//! RDS adapters, one per resource kind
//!
//! Each adapter translates its spec into [`RdsApi`] requests and provider
//! snapshots back into readiness, drift and resolved attributes. All of them
//! share one provider binding.

mod cluster;
mod instance;
mod parameter_group;
mod subnet_group;

pub use cluster::ClusterAdapter;
pub use instance::InstanceAdapter;
pub use parameter_group::ParameterGroupAdapter;
pub use subnet_group::SubnetGroupAdapter;

use std::sync::Arc;

use crate::error::Result;
use crate::traits::{RdsApi, ResourceRemover};
use crate::types::ResourceKind;

/// `NotFound` from a describe call means "no such resource"
pub(crate) fn found<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(resource) => Ok(Some(resource)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Deleting something that is already gone succeeds
pub(crate) fn absent_ok(result: Result<()>) -> Result<()> {
    match result {
        Err(e) if e.is_not_found() => Ok(()),
        other => other,
    }
}

/// The five adapters over one provider binding
#[derive(Clone)]
pub struct RdsAdapters {
    pub cluster: Arc<ClusterAdapter>,
    pub instance: Arc<InstanceAdapter>,
    pub parameter_group: Arc<ParameterGroupAdapter>,
    pub cluster_parameter_group: Arc<ParameterGroupAdapter>,
    pub subnet_group: Arc<SubnetGroupAdapter>,
}

impl RdsAdapters {
    pub fn new(api: Arc<dyn RdsApi>) -> Self {
        Self {
            cluster: Arc::new(ClusterAdapter::new(api.clone())),
            instance: Arc::new(InstanceAdapter::new(api.clone())),
            parameter_group: Arc::new(ParameterGroupAdapter::new(api.clone())),
            cluster_parameter_group: Arc::new(ParameterGroupAdapter::cluster(api.clone())),
            subnet_group: Arc::new(SubnetGroupAdapter::new(api)),
        }
    }

    /// Kind-agnostic remover for deletion requests
    pub fn remover(&self, kind: ResourceKind) -> Arc<dyn ResourceRemover> {
        let remover: Arc<dyn ResourceRemover> = match kind {
            ResourceKind::Cluster => self.cluster.clone(),
            ResourceKind::Instance => self.instance.clone(),
            ResourceKind::ParameterGroup => self.parameter_group.clone(),
            ResourceKind::ClusterParameterGroup => self.cluster_parameter_group.clone(),
            ResourceKind::SubnetGroup => self.subnet_group.clone(),
        };
        remover
    }

    /// Removers for every kind
    pub fn removers(&self) -> Vec<Arc<dyn ResourceRemover>> {
        ResourceKind::ALL.iter().map(|kind| self.remover(*kind)).collect()
    }
}

impl std::fmt::Debug for RdsAdapters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RdsAdapters").finish_non_exhaustive()
    }
}
