// # RDS API Trait
//
// Defines the request/response surface of the managed-database provider.
//
// ## Implementations
//
// - Simulated in-process backend: `aurora-provider-sim` crate
// - Future: an AWS SDK binding
//
// ## Usage
//
// ```rust,ignore
// use aurora_core::traits::{CreateDbClusterInput, RdsApi};
//
// let cluster = match api.describe_db_cluster("db1").await {
//     Ok(cluster) => cluster,
//     Err(e) if e.is_not_found() => api.create_db_cluster(CreateDbClusterInput::from(&spec)).await?,
//     Err(e) => return Err(e),
// };
// ```
//
// Request inputs are plain structs built in one step from a spec.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::Result;
use crate::types::{ClusterSpec, InstanceSpec, ParameterGroupSpec, SubnetGroupSpec};

/// Status token the provider reports for a usable cluster or instance
pub const STATUS_AVAILABLE: &str = "available";

/// Which flavour of parameter group a call addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterGroupScope {
    /// DB (instance-level) parameter group
    Instance,
    /// DB cluster parameter group
    Cluster,
}

impl ParameterGroupScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterGroupScope::Instance => "parameter_group",
            ParameterGroupScope::Cluster => "cluster_parameter_group",
        }
    }
}

/// Provider description of a DB cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbCluster {
    pub identifier: String,
    /// Lifecycle token, e.g. "creating", "available", "modifying"
    pub status: String,
    pub engine: String,
    pub engine_version: String,
    pub master_username: String,
    pub vpc_security_group_ids: Vec<String>,
    pub db_subnet_group: Option<String>,
    pub db_cluster_parameter_group: Option<String>,
    pub endpoint: Option<String>,
    pub reader_endpoint: Option<String>,
}

/// Provider description of a DB instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbInstance {
    pub identifier: String,
    pub cluster_identifier: String,
    pub status: String,
    pub engine: String,
    pub instance_class: String,
    pub db_parameter_group: Option<String>,
    pub endpoint: Option<String>,
}

/// Provider description of a DB or DB cluster parameter group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbParameterGroup {
    pub name: String,
    pub family: String,
    pub description: String,
    /// Current user-set parameter values
    pub parameters: BTreeMap<String, String>,
}

/// Provider description of a DB subnet group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbSubnetGroup {
    pub name: String,
    pub description: String,
    pub subnet_ids: Vec<String>,
    pub status: String,
}

/// Create request for a DB cluster
#[derive(Clone, PartialEq, Eq)]
pub struct CreateDbClusterInput {
    pub identifier: String,
    pub engine: String,
    pub engine_version: Option<String>,
    pub master_username: String,
    pub master_user_password: String,
    pub vpc_security_group_ids: Vec<String>,
    pub db_subnet_group_name: Option<String>,
    pub db_cluster_parameter_group_name: Option<String>,
}

impl From<&ClusterSpec> for CreateDbClusterInput {
    fn from(spec: &ClusterSpec) -> Self {
        Self {
            identifier: spec.id.clone(),
            engine: spec.engine.clone(),
            engine_version: spec.engine_version.clone(),
            master_username: spec.master_username.clone(),
            master_user_password: spec.master_user_password.clone(),
            vpc_security_group_ids: spec.security_group_ids.clone(),
            db_subnet_group_name: spec.subnet_group_name.clone(),
            db_cluster_parameter_group_name: spec.parameter_group_name.clone(),
        }
    }
}

// Custom Debug implementation that hides the master password
impl fmt::Debug for CreateDbClusterInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateDbClusterInput")
            .field("identifier", &self.identifier)
            .field("engine", &self.engine)
            .field("engine_version", &self.engine_version)
            .field("master_username", &self.master_username)
            .field("master_user_password", &"<REDACTED>")
            .field("vpc_security_group_ids", &self.vpc_security_group_ids)
            .field("db_subnet_group_name", &self.db_subnet_group_name)
            .field(
                "db_cluster_parameter_group_name",
                &self.db_cluster_parameter_group_name,
            )
            .finish()
    }
}

/// Modify request for a DB cluster; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModifyDbClusterInput {
    pub identifier: String,
    pub engine_version: Option<String>,
    pub vpc_security_group_ids: Option<Vec<String>>,
    pub db_cluster_parameter_group_name: Option<String>,
    pub apply_immediately: bool,
}

impl ModifyDbClusterInput {
    /// `true` when the request would change nothing
    pub fn is_empty(&self) -> bool {
        self.engine_version.is_none()
            && self.vpc_security_group_ids.is_none()
            && self.db_cluster_parameter_group_name.is_none()
    }
}

/// Delete request for a DB cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteDbClusterInput {
    pub identifier: String,
    pub skip_final_snapshot: bool,
}

/// Create request for a DB instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDbInstanceInput {
    pub identifier: String,
    pub cluster_identifier: String,
    pub engine: String,
    pub instance_class: String,
    pub allocated_storage: Option<u32>,
    pub db_parameter_group_name: Option<String>,
}

impl From<&InstanceSpec> for CreateDbInstanceInput {
    fn from(spec: &InstanceSpec) -> Self {
        Self {
            identifier: spec.id.clone(),
            cluster_identifier: spec.cluster_id.clone(),
            engine: spec.engine.clone(),
            instance_class: spec.instance_class.clone(),
            allocated_storage: spec.allocated_storage,
            db_parameter_group_name: spec.parameter_group_name.clone(),
        }
    }
}

/// Modify request for a DB instance; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModifyDbInstanceInput {
    pub identifier: String,
    pub instance_class: Option<String>,
    pub db_parameter_group_name: Option<String>,
    pub apply_immediately: bool,
}

impl ModifyDbInstanceInput {
    /// `true` when the request would change nothing
    pub fn is_empty(&self) -> bool {
        self.instance_class.is_none() && self.db_parameter_group_name.is_none()
    }
}

/// Delete request for a DB instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteDbInstanceInput {
    pub identifier: String,
    pub skip_final_snapshot: bool,
}

/// Create request for a parameter group (either scope)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateParameterGroupInput {
    pub name: String,
    pub family: String,
    pub description: String,
}

impl From<&ParameterGroupSpec> for CreateParameterGroupInput {
    fn from(spec: &ParameterGroupSpec) -> Self {
        Self {
            name: spec.name.clone(),
            family: spec.family.clone(),
            description: spec.description.clone(),
        }
    }
}

/// When a parameter change takes effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplyMethod {
    Immediate,
    PendingReboot,
}

/// One parameter value to set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterChange {
    pub name: String,
    pub value: String,
    pub apply_method: ApplyMethod,
}

/// Modify request for a parameter group (either scope)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyParameterGroupInput {
    pub name: String,
    pub parameters: Vec<ParameterChange>,
}

/// Create request for a DB subnet group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateDbSubnetGroupInput {
    pub name: String,
    pub description: String,
    pub subnet_ids: Vec<String>,
}

impl From<&SubnetGroupSpec> for CreateDbSubnetGroupInput {
    fn from(spec: &SubnetGroupSpec) -> Self {
        Self {
            name: spec.name.clone(),
            description: spec.description.clone(),
            subnet_ids: spec.subnet_ids.clone(),
        }
    }
}

/// Modify request for a DB subnet group; replaces description and members
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyDbSubnetGroupInput {
    pub name: String,
    pub description: String,
    pub subnet_ids: Vec<String>,
}

impl From<&SubnetGroupSpec> for ModifyDbSubnetGroupInput {
    fn from(spec: &SubnetGroupSpec) -> Self {
        Self {
            name: spec.name.clone(),
            description: spec.description.clone(),
            subnet_ids: spec.subnet_ids.clone(),
        }
    }
}

/// Trait for managed-database provider bindings
///
/// Every `describe_*` call returns `Error::NotFound` when the provider does
/// not know the identifier. Any other error is treated as transient.
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ Perform network I/O to the provider API
/// - ✅ Map provider errors into `Error::Provider` / `Error::NotFound`
///
/// ## Forbidden Capabilities
/// - ❌ Retry or sleep (the dispatcher requeues)
/// - ❌ Access the object store
/// - ❌ Decide state transitions
#[async_trait]
pub trait RdsApi: Send + Sync {
    async fn describe_db_cluster(&self, identifier: &str) -> Result<DbCluster>;
    async fn create_db_cluster(&self, input: CreateDbClusterInput) -> Result<DbCluster>;
    async fn modify_db_cluster(&self, input: ModifyDbClusterInput) -> Result<DbCluster>;
    async fn delete_db_cluster(&self, input: DeleteDbClusterInput) -> Result<()>;

    async fn describe_db_instance(&self, identifier: &str) -> Result<DbInstance>;
    async fn create_db_instance(&self, input: CreateDbInstanceInput) -> Result<DbInstance>;
    async fn modify_db_instance(&self, input: ModifyDbInstanceInput) -> Result<DbInstance>;
    async fn delete_db_instance(&self, input: DeleteDbInstanceInput) -> Result<()>;

    async fn describe_parameter_group(
        &self,
        scope: ParameterGroupScope,
        name: &str,
    ) -> Result<DbParameterGroup>;
    async fn create_parameter_group(
        &self,
        scope: ParameterGroupScope,
        input: CreateParameterGroupInput,
    ) -> Result<DbParameterGroup>;
    async fn modify_parameter_group(
        &self,
        scope: ParameterGroupScope,
        input: ModifyParameterGroupInput,
    ) -> Result<()>;
    async fn delete_parameter_group(&self, scope: ParameterGroupScope, name: &str) -> Result<()>;

    async fn describe_db_subnet_group(&self, name: &str) -> Result<DbSubnetGroup>;
    async fn create_db_subnet_group(&self, input: CreateDbSubnetGroupInput)
    -> Result<DbSubnetGroup>;
    async fn modify_db_subnet_group(&self, input: ModifyDbSubnetGroupInput)
    -> Result<DbSubnetGroup>;
    async fn delete_db_subnet_group(&self, name: &str) -> Result<()>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing provider bindings from configuration
pub trait RdsApiFactory: Send + Sync {
    /// Create an RdsApi instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration specific to this provider
    fn create(&self, config: &serde_json::Value) -> Result<Box<dyn RdsApi>>;
}
