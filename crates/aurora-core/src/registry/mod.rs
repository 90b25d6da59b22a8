//! Plugin-based provider registry
//!
//! The registry allows provider bindings and object stores to be registered
//! dynamically at runtime, avoiding hardcoded if-else chains.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use aurora_core::registry::ProviderRegistry;
//! use aurora_core::config::ProviderConfig;
//!
//! // Create a registry with the built-in stores
//! let registry = ProviderRegistry::with_builtin_stores();
//!
//! // Register providers
//! aurora_provider_sim::register(&registry);
//!
//! // Create provider from config
//! let api = registry.create_provider(&ProviderConfig::default())?;
//! ```
//!
//! ## Registration
//!
//! Implementations should register themselves during initialization:
//!
//! ```rust,ignore
//! // In aurora-provider-sim crate
//! pub fn register(registry: &ProviderRegistry) {
//!     registry.register_provider("simulated", Box::new(SimulatedRdsFactory));
//! }
//! ```

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::config::{ProviderConfig, StoreConfig};
use crate::error::{Error, Result};
use crate::store::{FileObjectStoreFactory, MemoryObjectStoreFactory};
use crate::traits::{ObjectStore, ObjectStoreFactory, RdsApi, RdsApiFactory};

/// Registry of provider bindings and object stores
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct ProviderRegistry {
    /// Registered provider factories
    providers: RwLock<HashMap<String, Arc<dyn RdsApiFactory>>>,

    /// Registered object store factories
    stores: RwLock<HashMap<String, Arc<dyn ObjectStoreFactory>>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the `memory` and `file` stores registered
    pub fn with_builtin_stores() -> Self {
        let registry = Self::new();
        registry.register_store("memory", Box::new(MemoryObjectStoreFactory));
        registry.register_store("file", Box::new(FileObjectStoreFactory));
        registry
    }

    /// Register a provider factory
    ///
    /// # Parameters
    ///
    /// - `name`: Provider type name (e.g., "simulated", "aws")
    /// - `factory`: Factory object for creating provider instances
    pub fn register_provider(&self, name: impl Into<String>, factory: Box<dyn RdsApiFactory>) {
        let mut providers = self
            .providers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        providers.insert(name.into(), Arc::from(factory));
    }

    /// Register an object store factory
    ///
    /// # Parameters
    ///
    /// - `name`: Store type name (e.g., "file", "memory")
    /// - `factory`: Factory object for creating store instances
    pub fn register_store(&self, name: impl Into<String>, factory: Box<dyn ObjectStoreFactory>) {
        let mut stores = self.stores.write().unwrap_or_else(PoisonError::into_inner);
        stores.insert(name.into(), Arc::from(factory));
    }

    /// Create a provider binding from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Arc<dyn RdsApi>)`: Created provider, shared by all adapters
    /// - `Err(Error)`: If the provider type is not registered or creation fails
    pub fn create_provider(&self, config: &ProviderConfig) -> Result<Arc<dyn RdsApi>> {
        config.validate()?;
        let provider_type = config.type_name();

        let factory = self
            .providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(provider_type)
            .cloned()
            .ok_or_else(|| Error::config(format!("Unknown provider type: {}", provider_type)))?;

        Ok(Arc::from(factory.create(&config.factory_config())?))
    }

    /// Create an object store from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn ObjectStore>)`: Created store instance
    /// - `Err(Error)`: If the store type is not registered or creation fails
    pub async fn create_store(&self, config: &StoreConfig) -> Result<Box<dyn ObjectStore>> {
        config.validate()?;
        let store_type = config.type_name();

        // Release the lock before calling async create
        let factory = self
            .stores
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(store_type)
            .cloned()
            .ok_or_else(|| Error::config(format!("Unknown store type: {}", store_type)))?;

        factory.create(&config.factory_config()).await
    }

    /// List all registered provider types
    pub fn list_providers(&self) -> Vec<String> {
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = providers.keys().cloned().collect();
        names.sort();
        names
    }

    /// List all registered store types
    pub fn list_stores(&self) -> Vec<String> {
        let stores = self.stores.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = stores.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a provider type is registered
    pub fn has_provider(&self, name: &str) -> bool {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Check if a store type is registered
    pub fn has_store(&self, name: &str) -> bool {
        self.stores
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockProviderFactory;

    impl RdsApiFactory for MockProviderFactory {
        fn create(&self, _config: &serde_json::Value) -> Result<Box<dyn RdsApi>> {
            Err(Error::not_found("Mock provider not implemented"))
        }
    }

    #[test]
    fn test_registry_registration() {
        let registry = ProviderRegistry::new();

        // Initially empty
        assert!(!registry.has_provider("mock"));

        // Register
        registry.register_provider("mock", Box::new(MockProviderFactory));

        // Now present
        assert!(registry.has_provider("mock"));
        assert_eq!(registry.list_providers(), vec!["mock".to_string()]);
    }

    #[test]
    fn test_unknown_provider_is_config_error() {
        let registry = ProviderRegistry::new();
        let config = ProviderConfig::Custom {
            factory: "aws".to_string(),
            config: serde_json::json!({}),
        };
        assert!(matches!(
            registry.create_provider(&config),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_builtin_stores() {
        let registry = ProviderRegistry::with_builtin_stores();
        assert_eq!(registry.list_stores(), vec!["file", "memory"]);

        let store = registry.create_store(&StoreConfig::Memory).await.unwrap();
        assert!(store.list(None).await.unwrap().is_empty());
    }
}
