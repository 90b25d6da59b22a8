// # Resource Adapter Trait
//
// Defines the per-kind translation between a desired spec and the provider.
//
// ## Implementations
//
// - `ClusterAdapter`, `InstanceAdapter`, `ParameterGroupAdapter` (DB and
//   cluster scope), `SubnetGroupAdapter`: see `crate::adapters`
//
// ## Usage
//
// ```rust,ignore
// use aurora_core::traits::ResourceAdapter;
//
// let existing = adapter.find_existing(adapter.identifier(&spec)).await?;
// match existing {
//     None => { adapter.create(&spec).await?; }
//     Some(resource) if adapter.is_ready(&resource) => {
//         adapter.apply_desired(&resource, &spec).await?;
//     }
//     Some(_) => { /* mid-transition, leave it alone */ }
// }
// ```

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ResolvedAttributes, ResourceKind};

/// Trait for per-kind resource adapters
///
/// The engine is generic over this trait and never special-cases a kind.
///
/// # Trust Level: Untrusted
///
/// ## Allowed Capabilities
/// - ✅ Issue provider calls for their own resource kind
/// - ✅ Translate specs into provider requests and snapshots into verdicts
///
/// ## Forbidden Capabilities
/// - ❌ Mutate status (owned by the engine, which decides every transition)
/// - ❌ Sleep, poll or retry (waiting is expressed as a requeue delay)
/// - ❌ Spawn tasks or threads
/// - ❌ Access the object store
#[async_trait]
pub trait ResourceAdapter: Send + Sync {
    /// Desired spec for this kind
    type Spec: Send + Sync;

    /// Provider snapshot for this kind
    type Resource: Send + Sync + std::fmt::Debug;

    /// The resource kind handled by this adapter
    fn kind(&self) -> ResourceKind;

    /// Provider identifier (or name) the spec declares
    fn identifier<'a>(&self, spec: &'a Self::Spec) -> &'a str;

    /// Idempotent lookup by identifier
    ///
    /// # Returns
    ///
    /// - `Ok(Some(resource))`: the resource exists
    /// - `Ok(None)`: the provider does not know the identifier
    /// - `Err(Error)`: the lookup itself failed
    async fn find_existing(&self, identifier: &str) -> Result<Option<Self::Resource>>;

    /// Create the resource; only called after `find_existing` returned `None`
    async fn create(&self, spec: &Self::Spec) -> Result<Self::Resource>;

    /// Push spec fields the provider resource does not reflect yet
    ///
    /// Must be a no-op (no provider write) when nothing differs.
    async fn apply_desired(&self, existing: &Self::Resource, spec: &Self::Spec) -> Result<()>;

    /// Delete the resource
    ///
    /// Absence of the resource is success.
    async fn delete(&self, identifier: &str) -> Result<()>;

    /// Kind-specific readiness predicate
    fn is_ready(&self, existing: &Self::Resource) -> bool;

    /// Human-readable differences between the provider resource and the spec
    ///
    /// An empty list means no drift.
    fn validate(&self, existing: &Self::Resource, spec: &Self::Spec) -> Vec<String>;

    /// Attributes published in the status once the resource is provisioned
    fn resolve(&self, existing: &Self::Resource) -> ResolvedAttributes;
}

/// Kind-agnostic view of an adapter used by deletion requests
///
/// Every [`ResourceAdapter`] is a `ResourceRemover` through a blanket
/// implementation, so the deletion engine can pick one by [`ResourceKind`]
/// at runtime.
#[async_trait]
pub trait ResourceRemover: Send + Sync {
    /// The resource kind handled by this remover
    fn resource_kind(&self) -> ResourceKind;

    /// `true` while the provider still reports the resource
    async fn exists(&self, identifier: &str) -> Result<bool>;

    /// Issue the delete call; absence is success
    async fn remove(&self, identifier: &str) -> Result<()>;
}

#[async_trait]
impl<A> ResourceRemover for A
where
    A: ResourceAdapter,
{
    fn resource_kind(&self) -> ResourceKind {
        self.kind()
    }

    async fn exists(&self, identifier: &str) -> Result<bool> {
        Ok(self.find_existing(identifier).await?.is_some())
    }

    async fn remove(&self, identifier: &str) -> Result<()> {
        self.delete(identifier).await
    }
}
