// # File Object Store
//
// File-based implementation of ObjectStore with crash recovery.
//
// ## Purpose
//
// Persists declared objects and their statuses across daemon restarts, so a
// restarted reconciler resumes every object from its last committed state
// (including readiness timestamps) instead of starting over.
//
// ## Crash Recovery
//
// - Atomic writes: Uses write-then-rename for atomicity
// - Corruption detection: Validates JSON on load
// - Automatic backup: Keeps .backup of last known good contents
// - Recovery: Falls back to backup if corruption detected
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "objects": [
//     {
//       "key": { "kind": "cluster", "name": "db1" },
//       "resource_version": 4,
//       "manifest": { "kind": "cluster", "spec": { "id": "db1", "...": "..." } },
//       "status": { "flavor": "lifecycle", "state": "provisioning", "ready_since": 1736424000000 }
//     }
//   ]
// }
// ```

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::{RwLock, broadcast};
use tokio_stream::Stream;

use super::{ObjectTable, WATCH_CAPACITY, watch_channel};
use crate::error::{Error, Result};
use crate::traits::{ObjectStore, ObjectStoreFactory, StoreEvent};
use crate::types::{Manifest, ObjectKey, ObjectKind, ObjectStatus, StoredObject};

/// Store file format version
/// Used for future migration if format changes
const STORE_FILE_VERSION: &str = "1.0";

/// File-based object store with crash recovery
///
/// Every mutation is written through to disk before the call returns.
///
/// # Example
///
/// ```rust,no_run
/// use aurora_core::store::FileObjectStore;
/// use aurora_core::traits::ObjectStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileObjectStore::new("/var/lib/aurora/objects.json").await?;
///     let objects = store.list(None).await?;
///     println!("{} declared objects", objects.len());
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileObjectStore {
    path: PathBuf,
    state: Arc<RwLock<FileState>>,
    events: broadcast::Sender<StoreEvent>,
}

/// Internal state for file-based store
#[derive(Debug)]
struct FileState {
    table: ObjectTable,
    dirty: bool,
}

/// Serializable store file format
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct StoreFileFormat {
    version: String,
    objects: Vec<StoredObject>,
}

impl FileObjectStore {
    /// Create or load a file object store
    ///
    /// This will:
    /// 1. Try to load the existing store file
    /// 2. If corruption detected, try to load from backup
    /// 3. If both fail, start empty
    /// 4. Create parent directories if needed
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    Error::config(format!(
                        "Failed to create store directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let objects = Self::load_with_recovery(&path).await?;
        let (events, _) = broadcast::channel(WATCH_CAPACITY);

        Ok(Self {
            path,
            state: Arc::new(RwLock::new(FileState {
                table: ObjectTable::from_objects(objects),
                dirty: false,
            })),
            events,
        })
    }

    /// Load objects from file with automatic recovery
    ///
    /// Only parse failures count as corruption; read errors are returned.
    async fn load_with_recovery(path: &Path) -> Result<Vec<StoredObject>> {
        let e = match Self::load(path).await {
            Ok(objects) => {
                tracing::debug!("Loaded object store: {} objects", objects.len());
                return Ok(objects);
            }
            Err(Error::Json(e)) => e,
            Err(e) => return Err(e),
        };

        tracing::warn!(
            "Store file {} appears corrupted: {}. Attempting recovery from backup.",
            path.display(),
            e
        );

        let backup_path = Self::backup_path(path);
        if !backup_path.exists() {
            tracing::warn!("No backup file found. Starting with an empty store.");
            return Ok(Vec::new());
        }

        match Self::load(&backup_path).await {
            Ok(objects) => {
                tracing::info!("Recovered object store from backup: {} objects", objects.len());
                if let Err(restore_err) = fs::copy(&backup_path, path).await {
                    tracing::error!("Failed to restore store file from backup: {}", restore_err);
                }
                Ok(objects)
            }
            Err(backup_err) => {
                tracing::error!(
                    "Backup also corrupted: {}. Starting with an empty store.",
                    backup_err
                );
                Ok(Vec::new())
            }
        }
    }

    /// Load objects from file
    async fn load(path: &Path) -> Result<Vec<StoredObject>> {
        if !path.exists() {
            tracing::debug!("Store file does not exist: {}", path.display());
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::store(format!("Failed to read store file {}: {}", path.display(), e))
        })?;

        let file: StoreFileFormat = serde_json::from_str(&content)?;

        if file.version != STORE_FILE_VERSION {
            tracing::warn!(
                "Store file version mismatch: expected {}, got {}. Attempting to load anyway.",
                STORE_FILE_VERSION,
                file.version
            );
        }

        Ok(file.objects)
    }

    /// Write the table to file atomically
    async fn write(&self) -> Result<()> {
        let mut state = self.state.write().await;

        let file = StoreFileFormat {
            version: STORE_FILE_VERSION.to_string(),
            objects: state.table.to_objects(),
        };
        let json = serde_json::to_string_pretty(&file)?;

        let temp_path = self.temp_path();
        {
            let mut out = fs::File::create(&temp_path).await.map_err(|e| {
                Error::store(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            out.write_all(json.as_bytes()).await.map_err(|e| {
                Error::store(format!(
                    "Failed to write to temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            out.flush().await.map_err(|e| {
                Error::store(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        if self.path.exists() {
            let backup_path = Self::backup_path(&self.path);
            if let Err(e) = fs::copy(&self.path, &backup_path).await {
                tracing::warn!("Failed to create backup: {}", e);
            }
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        state.dirty = false;
        tracing::trace!("Object store written to file: {}", self.path.display());
        Ok(())
    }

    /// Get path to temporary file for atomic writes
    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    /// Get path to backup file
    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }

    fn publish(&self, event: StoreEvent) {
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl ObjectStore for FileObjectStore {
    async fn get(&self, key: &ObjectKey) -> Result<Option<StoredObject>> {
        Ok(self.state.read().await.table.get(key))
    }

    async fn list(&self, kind: Option<ObjectKind>) -> Result<Vec<StoredObject>> {
        Ok(self.state.read().await.table.list(kind))
    }

    async fn apply(&self, name: &str, manifest: Manifest) -> Result<StoredObject> {
        let object = {
            let mut state = self.state.write().await;
            let object = state.table.apply(name, manifest)?;
            state.dirty = true;
            object
        };

        // Immediate write for durability
        self.write().await?;
        self.publish(StoreEvent::Applied(object.key.clone()));
        Ok(object)
    }

    async fn delete(&self, key: &ObjectKey) -> Result<bool> {
        let removed = {
            let mut state = self.state.write().await;
            let removed = state.table.delete(key);
            state.dirty |= removed;
            removed
        };

        if removed {
            self.write().await?;
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
        let version = {
            let mut state = self.state.write().await;
            let version = state.table.update_status(key, expected_version, status)?;
            state.dirty = true;
            version
        };

        self.write().await?;
        Ok(version)
    }

    fn watch(&self) -> Pin<Box<dyn Stream<Item = StoreEvent> + Send + 'static>> {
        watch_channel(&self.events)
    }

    async fn flush(&self) -> Result<()> {
        let dirty = self.state.read().await.dirty;
        if dirty {
            self.write().await
        } else {
            Ok(())
        }
    }
}

/// Factory for [`FileObjectStore`]
///
/// Expects `{"path": "/var/lib/aurora/objects.json"}`.
#[derive(Debug, Default)]
pub struct FileObjectStoreFactory;

#[async_trait]
impl ObjectStoreFactory for FileObjectStoreFactory {
    async fn create(&self, config: &serde_json::Value) -> Result<Box<dyn ObjectStore>> {
        let path = config
            .get("path")
            .and_then(|p| p.as_str())
            .ok_or_else(|| Error::config("file store requires a 'path' string"))?;
        Ok(Box::new(FileObjectStore::new(path).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClusterSpec, LifecycleState, LifecycleStatus};
    use tempfile::tempdir;

    fn cluster(version: &str) -> Manifest {
        Manifest::Cluster(ClusterSpec {
            id: "db1".to_string(),
            engine: "aurora-postgresql".to_string(),
            engine_version: Some(version.to_string()),
            master_username: "admin".to_string(),
            master_user_password: "pw".to_string(),
            security_group_ids: vec!["sg-1".to_string()],
            subnet_group_name: None,
            parameter_group_name: None,
        })
    }

    fn provisioning(ready_since: i64) -> ObjectStatus {
        ObjectStatus::Lifecycle(LifecycleStatus {
            state: LifecycleState::Provisioning,
            ready_since,
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_file_store_persists_status() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("objects.json");

        let store = FileObjectStore::new(&path).await.unwrap();
        assert!(store.list(None).await.unwrap().is_empty());

        let object = store.apply("db1", cluster("15.4")).await.unwrap();
        store
            .update_status(&object.key, 1, provisioning(1_736_424_000_000))
            .await
            .unwrap();
        assert!(path.exists());

        let reopened = FileObjectStore::new(&path).await.unwrap();
        let loaded = reopened.get(&object.key).await.unwrap().unwrap();
        assert_eq!(loaded.status, provisioning(1_736_424_000_000));
        assert_eq!(loaded.resource_version, 2);
    }

    #[tokio::test]
    async fn test_file_store_corruption_recovery() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("objects.json");

        let store = FileObjectStore::new(&path).await.unwrap();
        let object = store.apply("db1", cluster("15.4")).await.unwrap();
        // Second write creates the backup of the first
        store.apply("db1", cluster("16.1")).await.unwrap();

        let backup_path = FileObjectStore::backup_path(&path);
        assert!(backup_path.exists(), "Backup file should exist after write");

        fs::write(&path, b"corrupted json data").await.unwrap();

        let recovered = FileObjectStore::new(&path).await.unwrap();
        let loaded = recovered.get(&object.key).await.unwrap().unwrap();
        assert_eq!(loaded.manifest, cluster("15.4"));
        assert_eq!(loaded.resource_version, 1);
    }

    #[tokio::test]
    async fn test_file_store_corrupted_without_backup_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("objects.json");
        fs::write(&path, b"{ not json").await.unwrap();

        let store = FileObjectStore::new(&path).await.unwrap();
        assert!(store.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_factory_requires_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("objects.json");

        assert!(
            FileObjectStoreFactory
                .create(&serde_json::json!({}))
                .await
                .is_err()
        );
        let store = FileObjectStoreFactory
            .create(&serde_json::json!({ "path": path }))
            .await
            .unwrap();
        store.apply("db1", cluster("15.4")).await.unwrap();
        assert!(path.exists());
    }
}
