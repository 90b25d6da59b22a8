// # Simulated RDS Provider
//
// This crate provides an in-process RDS backend for the aurora reconciler,
// for local runs and end-to-end tests without a cloud account.
//
// ## Behaviour
//
// - ✅ Clusters and instances start in `creating` and become `available`
//   after `ready_after_polls` describe calls
// - ✅ Modifications put a resource in `modifying` for the same number of polls
// - ✅ Deletes put a resource in `deleting`; it disappears after
//   `delete_after_polls` describe calls
// - ✅ Parameter groups and subnet groups are usable immediately
// - ✅ Referential checks the real service performs (instance needs its
//   cluster, a cluster with members cannot be deleted, ...)
// - ✅ Dry-run mode: reads work, writes are logged and dropped
// - ✅ Failure injection for tests (`fail_next`)
// - ❌ NO background tasks: time only advances when the reconciler describes
// - ❌ NO retry logic (owned by the reconciler's requeue policy)
//
// ## Trust Level: Untrusted (Provider)
//
// **Allowed Capabilities**:
// - ✅ Answer describe/create/modify/delete calls
// - ✅ Keep its own simulated resource table
//
// **Forbidden Capabilities**:
// - ❌ Spawn tasks or threads (violates shutdown determinism)
// - ❌ Access the object store
// - ❌ Make scheduling decisions

use async_trait::async_trait;
use aurora_core::traits::{
    CreateDbClusterInput, CreateDbInstanceInput, CreateDbSubnetGroupInput,
    CreateParameterGroupInput, DbCluster, DbInstance, DbParameterGroup, DbSubnetGroup,
    DeleteDbClusterInput, DeleteDbInstanceInput, ModifyDbClusterInput, ModifyDbInstanceInput,
    ModifyDbSubnetGroupInput, ModifyParameterGroupInput, ParameterGroupScope, RdsApi,
    RdsApiFactory, STATUS_AVAILABLE,
};
use aurora_core::{Error, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Default number of describe calls before a new resource is available
pub const DEFAULT_READY_AFTER_POLLS: u32 = 3;

/// Default number of describe calls before a deleted resource is gone
pub const DEFAULT_DELETE_AFTER_POLLS: u32 = 2;

/// Where a simulated cluster or instance is in its provider-side lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// `available`
    Settled,
    /// `creating` / `modifying` until the countdown runs out
    Transition {
        status: &'static str,
        polls_left: u32,
    },
    /// `deleting` until the countdown runs out, then gone
    Deleting { polls_left: u32 },
}

/// A simulated resource plus its lifecycle phase
#[derive(Debug, Clone)]
struct Tracked<T> {
    resource: T,
    phase: Phase,
}

impl<T> Tracked<T> {
    fn transitioning(resource: T, status: &'static str, polls: u32) -> Self {
        Self {
            resource,
            phase: Phase::Transition {
                status,
                polls_left: polls,
            },
        }
    }

    fn is_settled(&self) -> bool {
        self.phase == Phase::Settled
    }

    /// Advance the countdown by one describe call
    ///
    /// Returns the status to report, or `None` once a delete has finished.
    fn poll(&mut self) -> Option<&'static str> {
        match self.phase {
            Phase::Settled => Some(STATUS_AVAILABLE),
            Phase::Transition { status, polls_left } => {
                let polls_left = polls_left.saturating_sub(1);
                if polls_left == 0 {
                    self.phase = Phase::Settled;
                    Some(STATUS_AVAILABLE)
                } else {
                    self.phase = Phase::Transition { status, polls_left };
                    Some(status)
                }
            }
            Phase::Deleting { polls_left } => {
                let polls_left = polls_left.saturating_sub(1);
                if polls_left == 0 {
                    None
                } else {
                    self.phase = Phase::Deleting { polls_left };
                    Some("deleting")
                }
            }
        }
    }

    /// Status as of the last poll, without advancing
    fn status(&self) -> &'static str {
        match self.phase {
            Phase::Settled => STATUS_AVAILABLE,
            Phase::Transition { status, .. } => status,
            Phase::Deleting { .. } => "deleting",
        }
    }
}

#[derive(Debug, Default)]
struct SimState {
    clusters: HashMap<String, Tracked<DbCluster>>,
    instances: HashMap<String, Tracked<DbInstance>>,
    parameter_groups: HashMap<(ParameterGroupScope, String), DbParameterGroup>,
    subnet_groups: HashMap<String, DbSubnetGroup>,
    fail_next: Option<Error>,
}

impl SimState {
    fn injected(&mut self) -> Result<()> {
        match self.fail_next.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn cluster_has_members(&self, cluster_id: &str) -> bool {
        self.instances
            .values()
            .any(|i| i.resource.cluster_identifier == cluster_id)
    }

    fn parameter_group_in_use(&self, scope: ParameterGroupScope, name: &str) -> bool {
        match scope {
            ParameterGroupScope::Cluster => self
                .clusters
                .values()
                .any(|c| c.resource.db_cluster_parameter_group.as_deref() == Some(name)),
            ParameterGroupScope::Instance => self
                .instances
                .values()
                .any(|i| i.resource.db_parameter_group.as_deref() == Some(name)),
        }
    }
}

/// Simulated RDS backend
///
/// # Trust Level: Untrusted
///
/// All state lives in memory behind one lock. Simulated time advances only
/// through describe calls, so tests stay deterministic.
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Answer describe calls from its (empty) table
/// - Log the intended write
/// - **NOT** record any change
pub struct SimulatedRds {
    state: RwLock<SimState>,
    ready_after_polls: u32,
    delete_after_polls: u32,
    dry_run: bool,
}

impl SimulatedRds {
    /// Create a new simulated provider
    ///
    /// # Parameters
    ///
    /// - `ready_after_polls`: describe calls before `creating`/`modifying` becomes `available`
    /// - `delete_after_polls`: describe calls before a `deleting` resource is gone
    pub fn new(ready_after_polls: u32, delete_after_polls: u32) -> Self {
        Self {
            state: RwLock::new(SimState::default()),
            ready_after_polls,
            delete_after_polls,
            dry_run: false,
        }
    }

    /// Same provider, logging writes instead of applying them
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Fail the next call of any kind with `error`
    pub async fn fail_next(&self, error: Error) {
        self.state.write().await.fail_next = Some(error);
    }

    /// Number of simulated clusters, including ones being deleted
    pub async fn cluster_count(&self) -> usize {
        self.state.read().await.clusters.len()
    }

    /// Number of simulated instances, including ones being deleted
    pub async fn instance_count(&self) -> usize {
        self.state.read().await.instances.len()
    }

    fn mode(&self) -> &'static str {
        if self.dry_run { "DRY-RUN" } else { "LIVE" }
    }

    fn default_engine_version(engine: &str) -> String {
        match engine {
            "aurora-postgresql" => "15.4".to_string(),
            "aurora-mysql" => "8.0.mysql_aurora.3.05.2".to_string(),
            _ => "1.0".to_string(),
        }
    }
}

impl Default for SimulatedRds {
    fn default() -> Self {
        Self::new(DEFAULT_READY_AFTER_POLLS, DEFAULT_DELETE_AFTER_POLLS)
    }
}

impl std::fmt::Debug for SimulatedRds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedRds")
            .field("ready_after_polls", &self.ready_after_polls)
            .field("delete_after_polls", &self.delete_after_polls)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RdsApi for SimulatedRds {
    async fn describe_db_cluster(&self, identifier: &str) -> Result<DbCluster> {
        let mut state = self.state.write().await;
        state.injected()?;

        let Some(tracked) = state.clusters.get_mut(identifier) else {
            return Err(Error::not_found(format!("DBClusterNotFound: {}", identifier)));
        };
        match tracked.poll() {
            Some(status) => {
                let mut cluster = tracked.resource.clone();
                cluster.status = status.to_string();
                Ok(cluster)
            }
            None => {
                state.clusters.remove(identifier);
                debug!("Simulated cluster {} is gone", identifier);
                Err(Error::not_found(format!("DBClusterNotFound: {}", identifier)))
            }
        }
    }

    async fn create_db_cluster(&self, input: CreateDbClusterInput) -> Result<DbCluster> {
        info!(?input, "Creating simulated cluster [mode: {}]", self.mode());
        let mut state = self.state.write().await;
        state.injected()?;

        if state.clusters.contains_key(&input.identifier) {
            return Err(Error::provider(
                "cluster",
                format!("DBClusterAlreadyExists: {}", input.identifier),
            ));
        }
        if let Some(group) = &input.db_subnet_group_name {
            if !state.subnet_groups.contains_key(group) {
                return Err(Error::provider(
                    "cluster",
                    format!("DBSubnetGroupNotFound: {}", group),
                ));
            }
        }
        if let Some(group) = &input.db_cluster_parameter_group_name {
            if !state
                .parameter_groups
                .contains_key(&(ParameterGroupScope::Cluster, group.clone()))
            {
                return Err(Error::provider(
                    "cluster",
                    format!("DBClusterParameterGroupNotFound: {}", group),
                ));
            }
        }

        let cluster = DbCluster {
            identifier: input.identifier.clone(),
            status: "creating".to_string(),
            engine_version: input
                .engine_version
                .clone()
                .unwrap_or_else(|| Self::default_engine_version(&input.engine)),
            engine: input.engine,
            master_username: input.master_username,
            vpc_security_group_ids: input.vpc_security_group_ids,
            db_subnet_group: input.db_subnet_group_name,
            db_cluster_parameter_group: input.db_cluster_parameter_group_name,
            endpoint: Some(format!("{}.cluster-sim.local", input.identifier)),
            reader_endpoint: Some(format!("{}.cluster-ro-sim.local", input.identifier)),
        };

        if self.dry_run {
            info!("[DRY-RUN] Would create cluster {}", cluster.identifier);
            return Ok(cluster);
        }

        state.clusters.insert(
            input.identifier,
            Tracked::transitioning(cluster.clone(), "creating", self.ready_after_polls),
        );
        Ok(cluster)
    }

    async fn modify_db_cluster(&self, input: ModifyDbClusterInput) -> Result<DbCluster> {
        info!(?input, "Modifying simulated cluster [mode: {}]", self.mode());
        let mut state = self.state.write().await;
        state.injected()?;

        let ready_after_polls = self.ready_after_polls;
        let Some(tracked) = state.clusters.get_mut(&input.identifier) else {
            return Err(Error::not_found(format!(
                "DBClusterNotFound: {}",
                input.identifier
            )));
        };
        if !tracked.is_settled() {
            return Err(Error::provider(
                "cluster",
                format!(
                    "InvalidDBClusterState: {} is {}",
                    input.identifier,
                    tracked.status()
                ),
            ));
        }

        let mut cluster = tracked.resource.clone();
        if let Some(version) = input.engine_version {
            cluster.engine_version = version;
        }
        if let Some(groups) = input.vpc_security_group_ids {
            cluster.vpc_security_group_ids = groups;
        }
        if let Some(group) = input.db_cluster_parameter_group_name {
            cluster.db_cluster_parameter_group = Some(group);
        }

        if self.dry_run {
            info!("[DRY-RUN] Would modify cluster {}", cluster.identifier);
            return Ok(cluster);
        }

        *tracked = Tracked::transitioning(cluster.clone(), "modifying", ready_after_polls);
        cluster.status = "modifying".to_string();
        Ok(cluster)
    }

    async fn delete_db_cluster(&self, input: DeleteDbClusterInput) -> Result<()> {
        info!(
            "Deleting simulated cluster {} (skip_final_snapshot: {}) [mode: {}]",
            input.identifier,
            input.skip_final_snapshot,
            self.mode()
        );
        let mut state = self.state.write().await;
        state.injected()?;

        if state.cluster_has_members(&input.identifier) {
            return Err(Error::provider(
                "cluster",
                format!("InvalidDBClusterState: {} still has instances", input.identifier),
            ));
        }

        let delete_after_polls = self.delete_after_polls;
        let Some(tracked) = state.clusters.get_mut(&input.identifier) else {
            return Err(Error::not_found(format!(
                "DBClusterNotFound: {}",
                input.identifier
            )));
        };

        if self.dry_run {
            info!("[DRY-RUN] Would delete cluster {}", input.identifier);
            return Ok(());
        }

        if !matches!(tracked.phase, Phase::Deleting { .. }) {
            tracked.phase = Phase::Deleting {
                polls_left: delete_after_polls,
            };
        }
        Ok(())
    }

    async fn describe_db_instance(&self, identifier: &str) -> Result<DbInstance> {
        let mut state = self.state.write().await;
        state.injected()?;

        let Some(tracked) = state.instances.get_mut(identifier) else {
            return Err(Error::not_found(format!("DBInstanceNotFound: {}", identifier)));
        };
        match tracked.poll() {
            Some(status) => {
                let mut instance = tracked.resource.clone();
                instance.status = status.to_string();
                Ok(instance)
            }
            None => {
                state.instances.remove(identifier);
                debug!("Simulated instance {} is gone", identifier);
                Err(Error::not_found(format!("DBInstanceNotFound: {}", identifier)))
            }
        }
    }

    async fn create_db_instance(&self, input: CreateDbInstanceInput) -> Result<DbInstance> {
        info!(?input, "Creating simulated instance [mode: {}]", self.mode());
        let mut state = self.state.write().await;
        state.injected()?;

        if state.instances.contains_key(&input.identifier) {
            return Err(Error::provider(
                "instance",
                format!("DBInstanceAlreadyExists: {}", input.identifier),
            ));
        }
        match state.clusters.get(&input.cluster_identifier) {
            None => {
                return Err(Error::provider(
                    "instance",
                    format!("DBClusterNotFound: {}", input.cluster_identifier),
                ));
            }
            Some(cluster) if cluster.resource.engine != input.engine => {
                return Err(Error::provider(
                    "instance",
                    format!(
                        "InvalidParameterCombination: engine {} does not match cluster engine {}",
                        input.engine, cluster.resource.engine
                    ),
                ));
            }
            Some(_) => {}
        }
        if let Some(group) = &input.db_parameter_group_name {
            if !state
                .parameter_groups
                .contains_key(&(ParameterGroupScope::Instance, group.clone()))
            {
                return Err(Error::provider(
                    "instance",
                    format!("DBParameterGroupNotFound: {}", group),
                ));
            }
        }

        let instance = DbInstance {
            identifier: input.identifier.clone(),
            cluster_identifier: input.cluster_identifier,
            status: "creating".to_string(),
            engine: input.engine,
            instance_class: input.instance_class,
            db_parameter_group: input.db_parameter_group_name,
            endpoint: Some(format!("{}.instance-sim.local", input.identifier)),
        };

        if self.dry_run {
            info!("[DRY-RUN] Would create instance {}", instance.identifier);
            return Ok(instance);
        }

        state.instances.insert(
            input.identifier,
            Tracked::transitioning(instance.clone(), "creating", self.ready_after_polls),
        );
        Ok(instance)
    }

    async fn modify_db_instance(&self, input: ModifyDbInstanceInput) -> Result<DbInstance> {
        info!(?input, "Modifying simulated instance [mode: {}]", self.mode());
        let mut state = self.state.write().await;
        state.injected()?;

        let ready_after_polls = self.ready_after_polls;
        let Some(tracked) = state.instances.get_mut(&input.identifier) else {
            return Err(Error::not_found(format!(
                "DBInstanceNotFound: {}",
                input.identifier
            )));
        };
        if !tracked.is_settled() {
            return Err(Error::provider(
                "instance",
                format!(
                    "InvalidDBInstanceState: {} is {}",
                    input.identifier,
                    tracked.status()
                ),
            ));
        }

        let mut instance = tracked.resource.clone();
        if let Some(class) = input.instance_class {
            instance.instance_class = class;
        }
        if let Some(group) = input.db_parameter_group_name {
            instance.db_parameter_group = Some(group);
        }

        if self.dry_run {
            info!("[DRY-RUN] Would modify instance {}", instance.identifier);
            return Ok(instance);
        }

        *tracked = Tracked::transitioning(instance.clone(), "modifying", ready_after_polls);
        instance.status = "modifying".to_string();
        Ok(instance)
    }

    async fn delete_db_instance(&self, input: DeleteDbInstanceInput) -> Result<()> {
        info!(
            "Deleting simulated instance {} (skip_final_snapshot: {}) [mode: {}]",
            input.identifier,
            input.skip_final_snapshot,
            self.mode()
        );
        let mut state = self.state.write().await;
        state.injected()?;

        let delete_after_polls = self.delete_after_polls;
        let Some(tracked) = state.instances.get_mut(&input.identifier) else {
            return Err(Error::not_found(format!(
                "DBInstanceNotFound: {}",
                input.identifier
            )));
        };

        if self.dry_run {
            info!("[DRY-RUN] Would delete instance {}", input.identifier);
            return Ok(());
        }

        if !matches!(tracked.phase, Phase::Deleting { .. }) {
            tracked.phase = Phase::Deleting {
                polls_left: delete_after_polls,
            };
        }
        Ok(())
    }

    async fn describe_parameter_group(
        &self,
        scope: ParameterGroupScope,
        name: &str,
    ) -> Result<DbParameterGroup> {
        let mut state = self.state.write().await;
        state.injected()?;

        state
            .parameter_groups
            .get(&(scope, name.to_string()))
            .cloned()
            .ok_or_else(|| Error::not_found(format!("{} {}", scope.as_str(), name)))
    }

    async fn create_parameter_group(
        &self,
        scope: ParameterGroupScope,
        input: CreateParameterGroupInput,
    ) -> Result<DbParameterGroup> {
        info!(?input, "Creating simulated {} [mode: {}]", scope.as_str(), self.mode());
        let mut state = self.state.write().await;
        state.injected()?;

        let key = (scope, input.name.clone());
        if state.parameter_groups.contains_key(&key) {
            return Err(Error::provider(
                scope.as_str(),
                format!("DBParameterGroupAlreadyExists: {}", input.name),
            ));
        }

        let group = DbParameterGroup {
            name: input.name,
            family: input.family,
            description: input.description,
            parameters: BTreeMap::new(),
        };

        if self.dry_run {
            info!("[DRY-RUN] Would create {} {}", scope.as_str(), group.name);
            return Ok(group);
        }

        state.parameter_groups.insert(key, group.clone());
        Ok(group)
    }

    async fn modify_parameter_group(
        &self,
        scope: ParameterGroupScope,
        input: ModifyParameterGroupInput,
    ) -> Result<()> {
        info!(
            "Setting {} parameter(s) on simulated {} {} [mode: {}]",
            input.parameters.len(),
            scope.as_str(),
            input.name,
            self.mode()
        );
        let mut state = self.state.write().await;
        state.injected()?;

        let dry_run = self.dry_run;
        let Some(group) = state.parameter_groups.get_mut(&(scope, input.name.clone())) else {
            return Err(Error::not_found(format!("{} {}", scope.as_str(), input.name)));
        };

        if dry_run {
            for change in &input.parameters {
                info!(
                    "[DRY-RUN] Would set {} = {} ({:?})",
                    change.name, change.value, change.apply_method
                );
            }
            return Ok(());
        }

        for change in input.parameters {
            group.parameters.insert(change.name, change.value);
        }
        Ok(())
    }

    async fn delete_parameter_group(&self, scope: ParameterGroupScope, name: &str) -> Result<()> {
        info!("Deleting simulated {} {} [mode: {}]", scope.as_str(), name, self.mode());
        let mut state = self.state.write().await;
        state.injected()?;

        if state.parameter_group_in_use(scope, name) {
            return Err(Error::provider(
                scope.as_str(),
                format!("InvalidDBParameterGroupState: {} is in use", name),
            ));
        }
        let key = (scope, name.to_string());
        if !state.parameter_groups.contains_key(&key) {
            return Err(Error::not_found(format!("{} {}", scope.as_str(), name)));
        }

        if self.dry_run {
            info!("[DRY-RUN] Would delete {} {}", scope.as_str(), name);
            return Ok(());
        }

        state.parameter_groups.remove(&key);
        Ok(())
    }

    async fn describe_db_subnet_group(&self, name: &str) -> Result<DbSubnetGroup> {
        let mut state = self.state.write().await;
        state.injected()?;

        state
            .subnet_groups
            .get(name)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("DBSubnetGroupNotFound: {}", name)))
    }

    async fn create_db_subnet_group(
        &self,
        input: CreateDbSubnetGroupInput,
    ) -> Result<DbSubnetGroup> {
        info!(?input, "Creating simulated subnet group [mode: {}]", self.mode());
        let mut state = self.state.write().await;
        state.injected()?;

        if state.subnet_groups.contains_key(&input.name) {
            return Err(Error::provider(
                "subnet_group",
                format!("DBSubnetGroupAlreadyExists: {}", input.name),
            ));
        }
        if input.subnet_ids.len() < 2 {
            return Err(Error::provider(
                "subnet_group",
                "DBSubnetGroupDoesNotCoverEnoughAZs: at least two subnets are required",
            ));
        }

        let group = DbSubnetGroup {
            name: input.name.clone(),
            description: input.description,
            subnet_ids: input.subnet_ids,
            status: "Complete".to_string(),
        };

        if self.dry_run {
            info!("[DRY-RUN] Would create subnet group {}", group.name);
            return Ok(group);
        }

        state.subnet_groups.insert(input.name, group.clone());
        Ok(group)
    }

    async fn modify_db_subnet_group(
        &self,
        input: ModifyDbSubnetGroupInput,
    ) -> Result<DbSubnetGroup> {
        info!(?input, "Modifying simulated subnet group [mode: {}]", self.mode());
        let mut state = self.state.write().await;
        state.injected()?;

        let dry_run = self.dry_run;
        let Some(group) = state.subnet_groups.get_mut(&input.name) else {
            return Err(Error::not_found(format!(
                "DBSubnetGroupNotFound: {}",
                input.name
            )));
        };

        let mut updated = group.clone();
        updated.description = input.description;
        updated.subnet_ids = input.subnet_ids;

        if dry_run {
            info!("[DRY-RUN] Would modify subnet group {}", updated.name);
            return Ok(updated);
        }

        *group = updated.clone();
        Ok(updated)
    }

    async fn delete_db_subnet_group(&self, name: &str) -> Result<()> {
        info!("Deleting simulated subnet group {} [mode: {}]", name, self.mode());
        let mut state = self.state.write().await;
        state.injected()?;

        let in_use = state
            .clusters
            .values()
            .any(|c| c.resource.db_subnet_group.as_deref() == Some(name));
        if in_use {
            return Err(Error::provider(
                "subnet_group",
                format!("InvalidDBSubnetGroupState: {} is in use", name),
            ));
        }
        if !state.subnet_groups.contains_key(name) {
            return Err(Error::not_found(format!("DBSubnetGroupNotFound: {}", name)));
        }

        if self.dry_run {
            info!("[DRY-RUN] Would delete subnet group {}", name);
            return Ok(());
        }

        state.subnet_groups.remove(name);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "simulated"
    }
}

/// Factory configuration, as produced by `ProviderConfig::Simulated`
#[derive(Debug, Deserialize)]
struct SimulatedConfig {
    #[serde(default = "default_ready_after_polls")]
    ready_after_polls: u32,
    #[serde(default = "default_delete_after_polls")]
    delete_after_polls: u32,
    #[serde(default)]
    dry_run: bool,
}

fn default_ready_after_polls() -> u32 {
    DEFAULT_READY_AFTER_POLLS
}

fn default_delete_after_polls() -> u32 {
    DEFAULT_DELETE_AFTER_POLLS
}

/// Factory for creating simulated providers
pub struct SimulatedRdsFactory;

impl RdsApiFactory for SimulatedRdsFactory {
    fn create(&self, config: &serde_json::Value) -> Result<Box<dyn RdsApi>> {
        let config: SimulatedConfig = serde_json::from_value(config.clone())
            .map_err(|e| Error::config(format!("Invalid simulated provider config: {}", e)))?;

        if config.dry_run {
            warn!("Simulated provider running in DRY-RUN mode - no changes will be recorded");
        }

        Ok(Box::new(
            SimulatedRds::new(config.ready_after_polls, config.delete_after_polls)
                .with_dry_run(config.dry_run),
        ))
    }
}

/// Register the simulated provider with a registry
///
/// This function should be called during initialization to make the
/// simulated provider available under the `simulated` type name.
///
/// # Example
///
/// ```rust
/// use aurora_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// aurora_provider_sim::register(&registry);
/// assert!(registry.has_provider("simulated"));
/// ```
pub fn register(registry: &aurora_core::ProviderRegistry) {
    registry.register_provider("simulated", Box::new(SimulatedRdsFactory));
}
