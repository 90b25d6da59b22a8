// # Object Store Trait
//
// Defines the interface for the declarative object store.
//
// ## Purpose
//
// The object store owns the declared objects (desired spec plus observed
// status) and notifies the dispatcher when a spec is applied or deleted.
// Status commits use optimistic concurrency: a commit carries the
// `resource_version` the pass started from and fails with
// `Error::Conflict` if another writer moved it in between.
//
// ## Implementations
//
// - In-memory: `MemoryObjectStore`
// - JSON file: `FileObjectStore`
//
// ## Usage
//
// ```rust,ignore
// use aurora_core::ObjectStore;
//
// let object = store.get(&key).await?.expect("declared");
// let status = /* reconcile pass */;
// store.update_status(&key, object.resource_version, status).await?;
// ```

use async_trait::async_trait;
use std::pin::Pin;
use tokio_stream::Stream;

use crate::error::Result;
use crate::types::{Manifest, ObjectKey, ObjectKind, ObjectStatus, StoredObject};

/// Change notification emitted by an object store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A spec was created or replaced
    Applied(ObjectKey),
    /// A declared object was removed
    Deleted(ObjectKey),
    /// Events were dropped; the subscriber must relist the store
    Resync,
}

impl StoreEvent {
    /// Key of the object the event is about, `None` for [`StoreEvent::Resync`]
    pub fn key(&self) -> Option<&ObjectKey> {
        match self {
            StoreEvent::Applied(key) | StoreEvent::Deleted(key) => Some(key),
            StoreEvent::Resync => None,
        }
    }
}

/// Trait for object store implementations
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks.
///
/// # Trust Level: Trusted (Core Component)
///
/// ## Allowed Capabilities
/// - ✅ Perform I/O for persistent storage
/// - ✅ Cache objects in memory (with explicit flush)
/// - ✅ Implement locking for thread safety
///
/// ## Forbidden Capabilities
/// - ❌ Interpret specs or decide state transitions (owned by the engines)
/// - ❌ Call the provider
/// - ❌ Emit events for status commits (only spec changes are deliveries)
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Get one declared object
    ///
    /// # Returns
    ///
    /// - `Ok(Some(StoredObject))`: the object
    /// - `Ok(None)`: not declared
    /// - `Err(Error)`: storage error
    async fn get(&self, key: &ObjectKey) -> Result<Option<StoredObject>>;

    /// List declared objects, optionally restricted to one kind
    ///
    /// Results are ordered by key.
    async fn list(&self, kind: Option<ObjectKind>) -> Result<Vec<StoredObject>>;

    /// Create or replace the spec of a declared object
    ///
    /// A replaced object keeps its status; its version is bumped. Emits
    /// [`StoreEvent::Applied`].
    ///
    /// # Returns
    ///
    /// The stored object after the write
    async fn apply(&self, name: &str, manifest: Manifest) -> Result<StoredObject>;

    /// Remove a declared object
    ///
    /// # Returns
    ///
    /// - `Ok(true)`: removed, [`StoreEvent::Deleted`] emitted
    /// - `Ok(false)`: was not declared
    async fn delete(&self, key: &ObjectKey) -> Result<bool>;

    /// Commit a new status
    ///
    /// # Errors
    ///
    /// - `Error::NotFound` if the object is gone
    /// - `Error::Conflict` if `expected_version` is not the current version
    ///
    /// # Returns
    ///
    /// The new resource version
    async fn update_status(
        &self,
        key: &ObjectKey,
        expected_version: u64,
        status: ObjectStatus,
    ) -> Result<u64>;

    /// Stream of spec changes
    ///
    /// Only changes made after the call are delivered. A subscriber that
    /// falls behind gets [`StoreEvent::Resync`] in place of the dropped
    /// events and must relist to catch up.
    fn watch(&self) -> Pin<Box<dyn Stream<Item = StoreEvent> + Send + 'static>>;

    /// Persist any pending changes
    async fn flush(&self) -> Result<()>;
}

/// Helper trait for constructing object stores from configuration
///
/// Construction is async because persistent stores load their contents
/// before they can serve reads.
#[async_trait]
pub trait ObjectStoreFactory: Send + Sync {
    /// Create an ObjectStore instance from configuration
    async fn create(&self, config: &serde_json::Value) -> Result<Box<dyn ObjectStore>>;
}
