//! Test doubles and common utilities for contract tests
//!
//! This module provides minimal test doubles that count calls and let a test
//! script what the provider reports, without any real cloud behaviour.

#![allow(dead_code)]

use aurora_core::error::{Error, Result};
use aurora_core::traits::{
    ApplyMethod, CreateDbClusterInput, CreateDbInstanceInput, CreateDbSubnetGroupInput,
    CreateParameterGroupInput, DbCluster, DbInstance, DbParameterGroup, DbSubnetGroup,
    DeleteDbClusterInput, DeleteDbInstanceInput, ModifyDbClusterInput, ModifyDbInstanceInput,
    ModifyDbSubnetGroupInput, ModifyParameterGroupInput, ObjectStore, ParameterGroupScope,
    RdsApi, ResourceAdapter, StoreEvent,
};
use aurora_core::types::{
    ClusterSpec, InstanceSpec, Manifest, ObjectKey, ObjectKind, ObjectStatus, ResolvedAttributes,
    ResourceKind, StoredObject,
};
use aurora_core::{EngineConfig, MemoryObjectStore, PassContext};
use std::collections::{BTreeMap, HashMap};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_stream::Stream;

// ---------------------------------------------------------------------------
// Scripted adapter
// ---------------------------------------------------------------------------

/// Desired spec handled by [`ScriptedAdapter`]
#[derive(Debug, Clone, PartialEq)]
pub struct TestSpec {
    pub id: String,
    pub engine: String,
}

impl TestSpec {
    pub fn new(id: &str, engine: &str) -> Self {
        Self {
            id: id.to_string(),
            engine: engine.to_string(),
        }
    }
}

/// Provider-side resource reported by [`ScriptedAdapter`]
#[derive(Debug, Clone, PartialEq)]
pub struct TestResource {
    pub id: String,
    pub engine: String,
    pub ready: bool,
}

/// A ResourceAdapter whose provider state is set by the test
///
/// `create` makes a not-ready resource; readiness and drift are flipped by
/// the test between passes.
#[derive(Default)]
pub struct ScriptedAdapter {
    resource: Mutex<Option<TestResource>>,
    fail_next: Mutex<Option<Error>>,
    find_calls: AtomicUsize,
    create_calls: AtomicUsize,
    apply_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl ScriptedAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adapter whose provider already holds `resource`
    pub fn with_resource(resource: TestResource) -> Self {
        let adapter = Self::new();
        adapter.set_resource(Some(resource));
        adapter
    }

    pub fn set_resource(&self, resource: Option<TestResource>) {
        *self.resource.lock().unwrap() = resource;
    }

    pub fn resource(&self) -> Option<TestResource> {
        self.resource.lock().unwrap().clone()
    }

    pub fn set_ready(&self, ready: bool) {
        if let Some(resource) = self.resource.lock().unwrap().as_mut() {
            resource.ready = ready;
        }
    }

    /// Make the provider report a different engine than declared
    pub fn set_engine(&self, engine: &str) {
        if let Some(resource) = self.resource.lock().unwrap().as_mut() {
            resource.engine = engine.to_string();
        }
    }

    /// Fail the next provider call with `error`
    pub fn fail_next(&self, error: Error) {
        *self.fail_next.lock().unwrap() = Some(error);
    }

    pub fn find_calls(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn apply_calls(&self) -> usize {
        self.apply_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    fn injected(&self) -> Result<()> {
        match self.fail_next.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl ResourceAdapter for ScriptedAdapter {
    type Spec = TestSpec;
    type Resource = TestResource;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Cluster
    }

    fn identifier<'a>(&self, spec: &'a TestSpec) -> &'a str {
        &spec.id
    }

    async fn find_existing(&self, identifier: &str) -> Result<Option<TestResource>> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        self.injected()?;
        Ok(self.resource().filter(|r| r.id == identifier))
    }

    async fn create(&self, spec: &TestSpec) -> Result<TestResource> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.injected()?;
        let resource = TestResource {
            id: spec.id.clone(),
            engine: spec.engine.clone(),
            ready: false,
        };
        self.set_resource(Some(resource.clone()));
        Ok(resource)
    }

    async fn apply_desired(&self, _existing: &TestResource, spec: &TestSpec) -> Result<()> {
        self.apply_calls.fetch_add(1, Ordering::SeqCst);
        self.injected()?;
        if let Some(resource) = self.resource.lock().unwrap().as_mut() {
            resource.engine = spec.engine.clone();
        }
        Ok(())
    }

    async fn delete(&self, identifier: &str) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.injected()?;
        let mut resource = self.resource.lock().unwrap();
        if resource.as_ref().is_some_and(|r| r.id == identifier) {
            *resource = None;
        }
        Ok(())
    }

    fn is_ready(&self, existing: &TestResource) -> bool {
        existing.ready
    }

    fn validate(&self, existing: &TestResource, spec: &TestSpec) -> Vec<String> {
        if existing.engine == spec.engine {
            Vec::new()
        } else {
            vec![format!(
                "engine: declared {}, actual {}",
                spec.engine, existing.engine
            )]
        }
    }

    fn resolve(&self, existing: &TestResource) -> ResolvedAttributes {
        ResolvedAttributes {
            identifier: Some(existing.id.clone()),
            endpoint: Some(format!("{}.cluster.test", existing.id)),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Scripted RDS API
// ---------------------------------------------------------------------------

/// An in-memory RdsApi whose readiness is a single switch
///
/// Clusters and instances report `available` while `ready` is set and
/// `creating` otherwise. Deletes take effect immediately.
pub struct ScriptedRds {
    clusters: Mutex<HashMap<String, DbCluster>>,
    instances: Mutex<HashMap<String, DbInstance>>,
    parameter_groups: Mutex<HashMap<(ParameterGroupScope, String), DbParameterGroup>>,
    subnet_groups: Mutex<HashMap<String, DbSubnetGroup>>,
    ready: AtomicBool,
    fail_next: Mutex<Option<Error>>,
    create_calls: AtomicUsize,
    modify_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl ScriptedRds {
    pub fn new() -> Self {
        Self {
            clusters: Mutex::new(HashMap::new()),
            instances: Mutex::new(HashMap::new()),
            parameter_groups: Mutex::new(HashMap::new()),
            subnet_groups: Mutex::new(HashMap::new()),
            ready: AtomicBool::new(true),
            fail_next: Mutex::new(None),
            create_calls: AtomicUsize::new(0),
            modify_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    pub fn fail_next(&self, error: Error) {
        *self.fail_next.lock().unwrap() = Some(error);
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn modify_calls(&self) -> usize {
        self.modify_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn has_cluster(&self, identifier: &str) -> bool {
        self.clusters.lock().unwrap().contains_key(identifier)
    }

    /// Change a cluster behind the reconciler's back
    pub fn tamper_cluster(&self, identifier: &str, f: impl FnOnce(&mut DbCluster)) {
        if let Some(cluster) = self.clusters.lock().unwrap().get_mut(identifier) {
            f(cluster);
        }
    }

    fn status(&self) -> String {
        if self.ready.load(Ordering::SeqCst) {
            "available".to_string()
        } else {
            "creating".to_string()
        }
    }

    fn injected(&self) -> Result<()> {
        match self.fail_next.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Default for ScriptedRds {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl RdsApi for ScriptedRds {
    async fn describe_db_cluster(&self, identifier: &str) -> Result<DbCluster> {
        self.injected()?;
        let mut cluster = self
            .clusters
            .lock()
            .unwrap()
            .get(identifier)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("cluster {}", identifier)))?;
        cluster.status = self.status();
        Ok(cluster)
    }

    async fn create_db_cluster(&self, input: CreateDbClusterInput) -> Result<DbCluster> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.injected()?;
        let cluster = DbCluster {
            identifier: input.identifier.clone(),
            status: "creating".to_string(),
            engine: input.engine,
            engine_version: input.engine_version.unwrap_or_else(|| "15.4".to_string()),
            master_username: input.master_username,
            vpc_security_group_ids: input.vpc_security_group_ids,
            db_subnet_group: input.db_subnet_group_name,
            db_cluster_parameter_group: input.db_cluster_parameter_group_name,
            endpoint: Some(format!("{}.cluster.test", input.identifier)),
            reader_endpoint: Some(format!("{}.cluster-ro.test", input.identifier)),
        };
        self.clusters
            .lock()
            .unwrap()
            .insert(input.identifier, cluster.clone());
        Ok(cluster)
    }

    async fn modify_db_cluster(&self, input: ModifyDbClusterInput) -> Result<DbCluster> {
        self.modify_calls.fetch_add(1, Ordering::SeqCst);
        self.injected()?;
        let mut clusters = self.clusters.lock().unwrap();
        let cluster = clusters
            .get_mut(&input.identifier)
            .ok_or_else(|| Error::not_found(format!("cluster {}", input.identifier)))?;
        if let Some(version) = input.engine_version {
            cluster.engine_version = version;
        }
        if let Some(groups) = input.vpc_security_group_ids {
            cluster.vpc_security_group_ids = groups;
        }
        if let Some(group) = input.db_cluster_parameter_group_name {
            cluster.db_cluster_parameter_group = Some(group);
        }
        Ok(cluster.clone())
    }

    async fn delete_db_cluster(&self, input: DeleteDbClusterInput) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.injected()?;
        self.clusters
            .lock()
            .unwrap()
            .remove(&input.identifier)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("cluster {}", input.identifier)))
    }

    async fn describe_db_instance(&self, identifier: &str) -> Result<DbInstance> {
        self.injected()?;
        let mut instance = self
            .instances
            .lock()
            .unwrap()
            .get(identifier)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("instance {}", identifier)))?;
        instance.status = self.status();
        Ok(instance)
    }

    async fn create_db_instance(&self, input: CreateDbInstanceInput) -> Result<DbInstance> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.injected()?;
        let instance = DbInstance {
            identifier: input.identifier.clone(),
            cluster_identifier: input.cluster_identifier,
            status: "creating".to_string(),
            engine: input.engine,
            instance_class: input.instance_class,
            db_parameter_group: input.db_parameter_group_name,
            endpoint: Some(format!("{}.instance.test", input.identifier)),
        };
        self.instances
            .lock()
            .unwrap()
            .insert(input.identifier, instance.clone());
        Ok(instance)
    }

    async fn modify_db_instance(&self, input: ModifyDbInstanceInput) -> Result<DbInstance> {
        self.modify_calls.fetch_add(1, Ordering::SeqCst);
        self.injected()?;
        let mut instances = self.instances.lock().unwrap();
        let instance = instances
            .get_mut(&input.identifier)
            .ok_or_else(|| Error::not_found(format!("instance {}", input.identifier)))?;
        if let Some(class) = input.instance_class {
            instance.instance_class = class;
        }
        if let Some(group) = input.db_parameter_group_name {
            instance.db_parameter_group = Some(group);
        }
        Ok(instance.clone())
    }

    async fn delete_db_instance(&self, input: DeleteDbInstanceInput) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.injected()?;
        self.instances
            .lock()
            .unwrap()
            .remove(&input.identifier)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("instance {}", input.identifier)))
    }

    async fn describe_parameter_group(
        &self,
        scope: ParameterGroupScope,
        name: &str,
    ) -> Result<DbParameterGroup> {
        self.injected()?;
        self.parameter_groups
            .lock()
            .unwrap()
            .get(&(scope, name.to_string()))
            .cloned()
            .ok_or_else(|| Error::not_found(format!("{} {}", scope.as_str(), name)))
    }

    async fn create_parameter_group(
        &self,
        scope: ParameterGroupScope,
        input: CreateParameterGroupInput,
    ) -> Result<DbParameterGroup> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.injected()?;
        let group = DbParameterGroup {
            name: input.name.clone(),
            family: input.family,
            description: input.description,
            parameters: BTreeMap::new(),
        };
        self.parameter_groups
            .lock()
            .unwrap()
            .insert((scope, input.name), group.clone());
        Ok(group)
    }

    async fn modify_parameter_group(
        &self,
        scope: ParameterGroupScope,
        input: ModifyParameterGroupInput,
    ) -> Result<()> {
        self.modify_calls.fetch_add(1, Ordering::SeqCst);
        self.injected()?;
        let mut groups = self.parameter_groups.lock().unwrap();
        let group = groups
            .get_mut(&(scope, input.name.clone()))
            .ok_or_else(|| Error::not_found(format!("{} {}", scope.as_str(), input.name)))?;
        for change in input.parameters {
            assert_eq!(change.apply_method, ApplyMethod::Immediate);
            group.parameters.insert(change.name, change.value);
        }
        Ok(())
    }

    async fn delete_parameter_group(&self, scope: ParameterGroupScope, name: &str) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.injected()?;
        self.parameter_groups
            .lock()
            .unwrap()
            .remove(&(scope, name.to_string()))
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("{} {}", scope.as_str(), name)))
    }

    async fn describe_db_subnet_group(&self, name: &str) -> Result<DbSubnetGroup> {
        self.injected()?;
        self.subnet_groups
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("subnet group {}", name)))
    }

    async fn create_db_subnet_group(
        &self,
        input: CreateDbSubnetGroupInput,
    ) -> Result<DbSubnetGroup> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.injected()?;
        let group = DbSubnetGroup {
            name: input.name.clone(),
            description: input.description,
            subnet_ids: input.subnet_ids,
            status: "Complete".to_string(),
        };
        self.subnet_groups
            .lock()
            .unwrap()
            .insert(input.name, group.clone());
        Ok(group)
    }

    async fn modify_db_subnet_group(
        &self,
        input: ModifyDbSubnetGroupInput,
    ) -> Result<DbSubnetGroup> {
        self.modify_calls.fetch_add(1, Ordering::SeqCst);
        self.injected()?;
        let mut groups = self.subnet_groups.lock().unwrap();
        let group = groups
            .get_mut(&input.name)
            .ok_or_else(|| Error::not_found(format!("subnet group {}", input.name)))?;
        group.description = input.description;
        group.subnet_ids = input.subnet_ids;
        Ok(group.clone())
    }

    async fn delete_db_subnet_group(&self, name: &str) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.injected()?;
        self.subnet_groups
            .lock()
            .unwrap()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| Error::not_found(format!("subnet group {}", name)))
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

// ---------------------------------------------------------------------------
// Flush-counting store
// ---------------------------------------------------------------------------

/// A MemoryObjectStore that counts flush() calls
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryObjectStore,
    flush_calls: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flush_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.flush_calls)
    }
}

#[async_trait::async_trait]
impl ObjectStore for CountingStore {
    async fn get(&self, key: &ObjectKey) -> Result<Option<StoredObject>> {
        self.inner.get(key).await
    }

    async fn list(&self, kind: Option<ObjectKind>) -> Result<Vec<StoredObject>> {
        self.inner.list(kind).await
    }

    async fn apply(&self, name: &str, manifest: Manifest) -> Result<StoredObject> {
        self.inner.apply(name, manifest).await
    }

    async fn delete(&self, key: &ObjectKey) -> Result<bool> {
        self.inner.delete(key).await
    }

    async fn update_status(
        &self,
        key: &ObjectKey,
        expected_version: u64,
        status: ObjectStatus,
    ) -> Result<u64> {
        self.inner.update_status(key, expected_version, status).await
    }

    fn watch(&self) -> Pin<Box<dyn Stream<Item = StoreEvent> + Send + 'static>> {
        self.inner.watch()
    }

    async fn flush(&self) -> Result<()> {
        self.flush_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.flush().await
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Engine configuration with the documented defaults
pub fn default_config() -> EngineConfig {
    EngineConfig::default()
}

/// Engine configuration that never waits, for driving the run loop quickly
pub fn eager_config() -> EngineConfig {
    EngineConfig {
        stabilization_secs: 0,
        error_requeue_secs: 0,
        blocked_requeue_secs: 0,
        poll_requeue_secs: 0,
        ..EngineConfig::default()
    }
}

pub fn ctx(name: &str, now: i64) -> PassContext {
    PassContext::new(ObjectKey::new(ObjectKind::Cluster, name), now)
}

pub fn cluster_spec(id: &str) -> ClusterSpec {
    ClusterSpec {
        id: id.to_string(),
        engine: "aurora-postgresql".to_string(),
        engine_version: Some("15.4".to_string()),
        master_username: "admin".to_string(),
        master_user_password: "hunter22".to_string(),
        security_group_ids: vec!["sg-1".to_string()],
        subnet_group_name: None,
        parameter_group_name: None,
    }
}

pub fn instance_spec(id: &str, cluster_id: &str) -> InstanceSpec {
    InstanceSpec {
        id: id.to_string(),
        cluster_id: cluster_id.to_string(),
        engine: "aurora-postgresql".to_string(),
        instance_class: "db.r6g.large".to_string(),
        allocated_storage: None,
        parameter_group_name: None,
    }
}
