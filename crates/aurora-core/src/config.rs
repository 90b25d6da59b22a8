//! Configuration types for the reconciler
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main reconciler configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Provider binding configuration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Object store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Engine and dispatcher settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl ReconcilerConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.provider.validate()?;
        self.store.validate()?;
        self.engine.validate()?;
        Ok(())
    }
}

/// Provider binding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// In-process simulated RDS backend
    Simulated {
        /// Describe calls before a created or modified resource reports ready
        #[serde(default = "default_ready_after_polls")]
        ready_after_polls: u32,
        /// Describe calls before a deleting resource disappears
        #[serde(default = "default_delete_after_polls")]
        delete_after_polls: u32,
        /// Log writes instead of performing them
        #[serde(default)]
        dry_run: bool,
    },

    /// Custom provider
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Simulated { .. } => Ok(()),
            ProviderConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom provider factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config("Custom provider config cannot be null"));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Simulated { .. } => "simulated",
            ProviderConfig::Custom { factory, .. } => factory,
        }
    }

    /// Configuration handed to the provider factory
    pub fn factory_config(&self) -> serde_json::Value {
        match self {
            ProviderConfig::Simulated {
                ready_after_polls,
                delete_after_polls,
                dry_run,
            } => serde_json::json!({
                "ready_after_polls": ready_after_polls,
                "delete_after_polls": delete_after_polls,
                "dry_run": dry_run,
            }),
            ProviderConfig::Custom { config, .. } => config.clone(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::Simulated {
            ready_after_polls: default_ready_after_polls(),
            delete_after_polls: default_delete_after_polls(),
            dry_run: false,
        }
    }
}

fn default_ready_after_polls() -> u32 {
    3
}

fn default_delete_after_polls() -> u32 {
    2
}

/// Object store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    /// In-memory store (not persistent)
    #[default]
    Memory,

    /// JSON file store
    File {
        /// Path to the store file
        path: String,
    },

    /// Custom store
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl StoreConfig {
    /// Validate the store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            StoreConfig::Memory => Ok(()),
            StoreConfig::File { path } => {
                if path.is_empty() {
                    return Err(crate::Error::config("File store path cannot be empty"));
                }
                Ok(())
            }
            StoreConfig::Custom { factory, .. } => {
                if factory.is_empty() {
                    return Err(crate::Error::config("Custom store factory cannot be empty"));
                }
                Ok(())
            }
        }
    }

    /// Get the store type name
    pub fn type_name(&self) -> &str {
        match self {
            StoreConfig::Memory => "memory",
            StoreConfig::File { .. } => "file",
            StoreConfig::Custom { factory, .. } => factory,
        }
    }

    /// Configuration handed to the store factory
    pub fn factory_config(&self) -> serde_json::Value {
        match self {
            StoreConfig::Memory => serde_json::Value::Null,
            StoreConfig::File { path } => serde_json::json!({ "path": path }),
            StoreConfig::Custom { config, .. } => config.clone(),
        }
    }
}

/// Engine configuration
///
/// All durations are whole seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How long a resource must be observed ready before it is promoted
    #[serde(default = "default_stabilization_secs")]
    pub stabilization_secs: u64,

    /// Requeue delay after any failed pass
    #[serde(default = "default_error_requeue_secs")]
    pub error_requeue_secs: u64,

    /// Requeue delay while a deletion is blocked by a dependent
    #[serde(default = "default_blocked_requeue_secs")]
    pub blocked_requeue_secs: u64,

    /// Requeue delay while polling `provisioning` / `executing`
    #[serde(default = "default_poll_requeue_secs")]
    pub poll_requeue_secs: u64,

    /// Redelivery delay when a pass asks for none
    #[serde(default = "default_resync_secs")]
    pub resync_secs: u64,

    /// Capacity of the dispatcher event channel
    ///
    /// When full, new events are dropped (with a warning log).
    ///
    /// Default: 1000 events
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.resync_secs == 0 {
            return Err(crate::Error::config("resync_secs must be > 0"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("event_channel_capacity must be > 0"));
        }
        Ok(())
    }

    pub fn stabilization(&self) -> Duration {
        Duration::from_secs(self.stabilization_secs)
    }

    pub fn resync(&self) -> Duration {
        Duration::from_secs(self.resync_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stabilization_secs: default_stabilization_secs(),
            error_requeue_secs: default_error_requeue_secs(),
            blocked_requeue_secs: default_blocked_requeue_secs(),
            poll_requeue_secs: default_poll_requeue_secs(),
            resync_secs: default_resync_secs(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_stabilization_secs() -> u64 {
    120
}

fn default_error_requeue_secs() -> u64 {
    1
}

fn default_blocked_requeue_secs() -> u64 {
    5
}

fn default_poll_requeue_secs() -> u64 {
    10
}

fn default_resync_secs() -> u64 {
    30
}

fn default_event_channel_capacity() -> usize {
    1000
}
