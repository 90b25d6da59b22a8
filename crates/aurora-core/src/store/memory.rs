// # Memory Object Store
//
// In-memory implementation of ObjectStore.
//
// ## Purpose
//
// Provides a simple, fast object store that doesn't persist across restarts.
// Useful for testing, embedding, and deployments that re-apply their
// manifests at startup.
//
// ## Crash Behavior
//
// - All declared objects and statuses are lost on restart
// - Re-applied manifests start from `state == ""`; the lifecycle engine
//   finds the existing provider resources again instead of re-creating them

use async_trait::async_trait;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};
use tokio_stream::Stream;

use super::{ObjectTable, WATCH_CAPACITY, watch_channel};
use crate::error::Result;
use crate::traits::{ObjectStore, ObjectStoreFactory, StoreEvent};
use crate::types::{Manifest, ObjectKey, ObjectKind, ObjectStatus, StoredObject};

/// In-memory object store implementation
///
/// Objects live in a map protected by a RwLock; spec changes are published
/// on a broadcast channel. Clones share the same contents.
///
/// # Example
///
/// ```rust,no_run
/// use aurora_core::store::MemoryObjectStore;
/// use aurora_core::traits::ObjectStore;
/// use aurora_core::types::{Manifest, SubnetGroupSpec};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryObjectStore::new();
///
///     let object = store
///         .apply(
///             "private",
///             Manifest::SubnetGroup(SubnetGroupSpec {
///                 name: "private".to_string(),
///                 description: "private subnets".to_string(),
///                 subnet_ids: vec!["subnet-a".to_string()],
///             }),
///         )
///         .await?;
///     assert_eq!(object.resource_version, 1);
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryObjectStore {
    inner: Arc<RwLock<ObjectTable>>,
    events: broadcast::Sender<StoreEvent>,
}

impl MemoryObjectStore {
    /// Create a new empty memory object store
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(WATCH_CAPACITY);
        Self {
            inner: Arc::new(RwLock::new(ObjectTable::default())),
            events,
        }
    }

    /// Get the number of declared objects
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn publish(&self, event: StoreEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get(&self, key: &ObjectKey) -> Result<Option<StoredObject>> {
        Ok(self.inner.read().await.get(key))
    }

    async fn list(&self, kind: Option<ObjectKind>) -> Result<Vec<StoredObject>> {
        Ok(self.inner.read().await.list(kind))
    }

    async fn apply(&self, name: &str, manifest: Manifest) -> Result<StoredObject> {
        let object = self.inner.write().await.apply(name, manifest)?;
        self.publish(StoreEvent::Applied(object.key.clone()));
        Ok(object)
    }

    async fn delete(&self, key: &ObjectKey) -> Result<bool> {
        let removed = self.inner.write().await.delete(key);
        if removed {
            self.publish(StoreEvent::Deleted(key.clone()));
        }
        Ok(removed)
    }

    async fn update_status(
        &self,
        key: &ObjectKey,
        expected_version: u64,
        status: ObjectStatus,
    ) -> Result<u64> {
        self.inner
            .write()
            .await
            .update_status(key, expected_version, status)
    }

    fn watch(&self) -> Pin<Box<dyn Stream<Item = StoreEvent> + Send + 'static>> {
        watch_channel(&self.events)
    }

    async fn flush(&self) -> Result<()> {
        // No-op for memory store (everything is already "persisted")
        Ok(())
    }
}

/// Factory for [`MemoryObjectStore`]; takes no configuration
#[derive(Debug, Default)]
pub struct MemoryObjectStoreFactory;

#[async_trait]
impl ObjectStoreFactory for MemoryObjectStoreFactory {
    async fn create(&self, _config: &serde_json::Value) -> Result<Box<dyn ObjectStore>> {
        Ok(Box::new(MemoryObjectStore::new()))
    }
}
