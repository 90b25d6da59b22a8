//! Contract Test: Deletion Ordering
//!
//! This test verifies that a deletion request never deletes a resource that
//! something declared still depends on.
//!
//! Constraints verified:
//! - A referenced resource keeps the request in `created`, pass after pass
//! - A resource still declared by a lifecycle object is not deleted
//! - Once the reference disappears, the request runs to `completed`
//! - Deleting an already absent resource is not an error
//!
//! If this test fails, someone has:
//! - Issued the delete call before the guard
//! - Cached the guard result across passes

mod common;

use aurora_core::engine::DeletionEngine;
use aurora_core::error::Error;
use aurora_core::traits::ResourceRemover;
use aurora_core::types::{
    DeletionSpec, DeletionState, DeletionStatus, Manifest, ObjectKey, ObjectKind, ResourceKind,
    StoredObject,
};
use aurora_core::PassContext;
use common::*;
use std::sync::Arc;
use std::time::Duration;

fn request(identifier: &str) -> DeletionSpec {
    DeletionSpec {
        kind: ResourceKind::Cluster,
        identifier: identifier.to_string(),
    }
}

fn created() -> DeletionStatus {
    DeletionStatus {
        state: DeletionState::Created,
    }
}

fn deletion_ctx(name: &str) -> PassContext {
    PassContext::new(ObjectKey::new(ObjectKind::Deletion, name), 0)
}

fn existing_cluster() -> Arc<ScriptedAdapter> {
    Arc::new(ScriptedAdapter::with_resource(TestResource {
        id: "db1".to_string(),
        engine: "aurora-postgresql".to_string(),
        ready: true,
    }))
}

fn engine_over(adapter: &Arc<ScriptedAdapter>) -> DeletionEngine {
    let remover: Arc<dyn ResourceRemover> = adapter.clone();
    DeletionEngine::new([remover], &default_config())
}

#[tokio::test]
async fn referenced_cluster_is_never_deleted() {
    let adapter = existing_cluster();
    let engine = engine_over(&adapter);
    let snapshot = vec![StoredObject::declared(
        "db1-a",
        Manifest::Instance(instance_spec("db1-a", "db1")),
    )];

    for _ in 0..5 {
        let failure = engine
            .reconcile(&request("db1"), &created(), &snapshot, &deletion_ctx("drop-db1"))
            .await
            .unwrap_err();

        assert!(failure.source.is_blocked());
        assert_eq!(failure.requeue_after, Duration::from_secs(5));
        assert!(
            failure.source.to_string().contains("instance/db1-a"),
            "reason should name the dependent: {}",
            failure.source
        );
    }

    assert_eq!(adapter.delete_calls(), 0);
    assert!(adapter.resource().is_some());
}

#[tokio::test]
async fn still_declared_cluster_is_not_deleted() {
    let adapter = existing_cluster();
    let engine = engine_over(&adapter);
    let snapshot = vec![StoredObject::declared(
        "db1",
        Manifest::Cluster(cluster_spec("db1")),
    )];

    let failure = engine
        .reconcile(&request("db1"), &created(), &snapshot, &deletion_ctx("drop-db1"))
        .await
        .unwrap_err();

    assert!(matches!(failure.source, Error::StillReferenced(_)));
    assert_eq!(adapter.delete_calls(), 0);
}

#[tokio::test]
async fn deletion_proceeds_once_the_reference_is_gone() {
    let adapter = existing_cluster();
    let engine = engine_over(&adapter);
    let spec = request("db1");
    let ctx = deletion_ctx("drop-db1");

    let blocked = vec![StoredObject::declared(
        "db1-a",
        Manifest::Instance(instance_spec("db1-a", "db1")),
    )];
    assert!(engine
        .reconcile(&spec, &created(), &blocked, &ctx)
        .await
        .is_err());

    // Unrelated objects do not block
    let snapshot = vec![StoredObject::declared(
        "db2-a",
        Manifest::Instance(instance_spec("db2-a", "db2")),
    )];

    let pass = engine
        .reconcile(&spec, &DeletionStatus::default(), &snapshot, &ctx)
        .await
        .unwrap();
    assert_eq!(pass.status.state, DeletionState::Created);

    let pass = engine
        .reconcile(&spec, &pass.status, &snapshot, &ctx)
        .await
        .unwrap();
    assert_eq!(pass.status.state, DeletionState::Executing);
    assert_eq!(adapter.delete_calls(), 1);

    let pass = engine
        .reconcile(&spec, &pass.status, &snapshot, &ctx)
        .await
        .unwrap();
    assert_eq!(pass.status.state, DeletionState::Completed);

    let done = engine
        .reconcile(&spec, &pass.status, &snapshot, &ctx)
        .await
        .unwrap();
    assert_eq!(done.status.state, DeletionState::Completed);
    assert_eq!(adapter.delete_calls(), 1);
}

#[tokio::test]
async fn executing_polls_while_the_resource_lingers() {
    let adapter = existing_cluster();
    let engine = engine_over(&adapter);
    let executing = DeletionStatus {
        state: DeletionState::Executing,
    };

    let pass = engine
        .reconcile(&request("db1"), &executing, &[], &deletion_ctx("drop-db1"))
        .await
        .unwrap();

    assert_eq!(pass.status.state, DeletionState::Executing);
    assert_eq!(pass.requeue_after, Some(Duration::from_secs(10)));
}

#[tokio::test]
async fn deleting_an_absent_resource_succeeds() {
    let adapter = Arc::new(ScriptedAdapter::new());
    let engine = engine_over(&adapter);

    adapter.fail_next(Error::not_found("cluster db1"));
    let pass = engine
        .reconcile(&request("db1"), &created(), &[], &deletion_ctx("drop-db1"))
        .await
        .unwrap();

    assert_eq!(pass.status.state, DeletionState::Executing);
}

#[tokio::test]
async fn kind_without_adapter_is_a_configuration_error() {
    let adapter = existing_cluster();
    let engine = engine_over(&adapter);
    let spec = DeletionSpec {
        kind: ResourceKind::SubnetGroup,
        identifier: "private".to_string(),
    };

    let failure = engine
        .reconcile(&spec, &created(), &[], &deletion_ctx("drop-private"))
        .await
        .unwrap_err();

    assert!(matches!(failure.source, Error::Config(_)));
    assert_eq!(failure.requeue_after, Duration::from_secs(1));
}
