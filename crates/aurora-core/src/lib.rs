// # aurora-core
//
// Core library for declaratively managed Aurora/RDS resources.
//
// ## Architecture Overview
//
// This library reconciles declared objects against a cloud database provider:
// - **ResourceAdapter**: Trait translating one resource kind to provider calls
// - **RdsApi**: Trait for the provider SDK (describe/create/modify/delete per kind)
// - **ObjectStore**: Trait for declared objects and their observed status
// - **LifecycleEngine / DeletionEngine**: One reconcile pass per call, no sleeping
// - **Controller**: Reference dispatcher that schedules passes and commits status
// - **ProviderRegistry**: Plugin-based registry for providers and stores
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Engines know nothing about provider request shapes
// 2. **Cooperative Scheduling**: Waiting is a returned requeue delay, never a sleep
// 3. **Plugin-Based**: Providers are registered dynamically, no hard-coded if-else
// 4. **Library-First**: All core functionality can be used as a library
// 5. **Idempotency**: Every pass is safe to repeat after an interruption

pub mod adapters;
pub mod config;
pub mod controller;
pub mod drift;
pub mod engine;
pub mod error;
pub mod guard;
pub mod registry;
pub mod stabilizer;
pub mod store;
pub mod traits;
pub mod types;

// Re-export core types for convenience
pub use adapters::RdsAdapters;
pub use config::{EngineConfig, ProviderConfig, ReconcilerConfig, StoreConfig};
pub use controller::{Controller, ControllerEvent};
pub use engine::{DeletionEngine, LifecycleEngine, PassContext, Reconciled};
pub use error::{Error, ReconcileError, Result};
pub use registry::ProviderRegistry;
pub use store::{FileObjectStore, MemoryObjectStore};
pub use traits::{Clock, ObjectStore, RdsApi, ResourceAdapter, ResourceRemover};
