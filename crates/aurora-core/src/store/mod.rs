// # Object Store Implementations
//
// This module provides implementations of the ObjectStore trait for
// different persistence strategies. Both share `ObjectTable`, which holds
// the versioning and optimistic-concurrency rules.

pub mod file;
pub mod memory;

pub use file::{FileObjectStore, FileObjectStoreFactory};
pub use memory::{MemoryObjectStore, MemoryObjectStoreFactory};

use std::collections::BTreeMap;
use std::pin::Pin;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use crate::error::{Error, Result};
use crate::traits::StoreEvent;
use crate::types::{Manifest, ObjectKey, ObjectKind, ObjectStatus, StoredObject};

/// Capacity of the change-event broadcast channel
pub(crate) const WATCH_CAPACITY: usize = 256;

/// Declared objects keyed by identity
#[derive(Debug, Default, Clone)]
pub(crate) struct ObjectTable {
    objects: BTreeMap<ObjectKey, StoredObject>,
}

impl ObjectTable {
    pub(crate) fn from_objects(objects: Vec<StoredObject>) -> Self {
        Self {
            objects: objects.into_iter().map(|o| (o.key.clone(), o)).collect(),
        }
    }

    pub(crate) fn to_objects(&self) -> Vec<StoredObject> {
        self.objects.values().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.objects.len()
    }

    pub(crate) fn get(&self, key: &ObjectKey) -> Option<StoredObject> {
        self.objects.get(key).cloned()
    }

    pub(crate) fn list(&self, kind: Option<ObjectKind>) -> Vec<StoredObject> {
        self.objects
            .values()
            .filter(|o| kind.is_none_or(|k| o.key.kind == k))
            .cloned()
            .collect()
    }

    /// Create the object, or replace its spec keeping the status
    pub(crate) fn apply(&mut self, name: &str, manifest: Manifest) -> Result<StoredObject> {
        if name.trim().is_empty() {
            return Err(Error::invalid_input("object name must not be empty"));
        }

        let key = ObjectKey::new(manifest.kind(), name);
        let object = match self.objects.get_mut(&key) {
            Some(existing) => {
                existing.manifest = manifest;
                existing.resource_version += 1;
                existing.clone()
            }
            None => {
                let object = StoredObject::declared(name, manifest);
                self.objects.insert(key, object.clone());
                object
            }
        };
        Ok(object)
    }

    pub(crate) fn delete(&mut self, key: &ObjectKey) -> bool {
        self.objects.remove(key).is_some()
    }

    /// Commit a status if `expected_version` is still current
    pub(crate) fn update_status(
        &mut self,
        key: &ObjectKey,
        expected_version: u64,
        status: ObjectStatus,
    ) -> Result<u64> {
        let object = self
            .objects
            .get_mut(key)
            .ok_or_else(|| Error::not_found(format!("object {}", key)))?;

        if object.resource_version != expected_version {
            return Err(Error::Conflict {
                key: key.clone(),
                expected: expected_version,
                actual: object.resource_version,
            });
        }

        let flavor_matches = matches!(
            (&status, key.kind.is_lifecycle()),
            (ObjectStatus::Lifecycle(_), true) | (ObjectStatus::Deletion(_), false)
        );
        if !flavor_matches {
            return Err(Error::invalid_input(format!(
                "status flavor does not match object kind {}",
                key.kind
            )));
        }

        object.status = status;
        object.resource_version += 1;
        Ok(object.resource_version)
    }
}

/// Subscribe to a store's change channel
///
/// A subscriber that fell behind receives a single [`StoreEvent::Resync`] in
/// place of the events it missed.
pub(crate) fn watch_channel(
    events: &broadcast::Sender<StoreEvent>,
) -> Pin<Box<dyn Stream<Item = StoreEvent> + Send + 'static>> {
    let stream = BroadcastStream::new(events.subscribe()).map(|event| match event {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Object store watcher lagged: {}", e);
            StoreEvent::Resync
        }
    });
    Box::pin(stream)
}
