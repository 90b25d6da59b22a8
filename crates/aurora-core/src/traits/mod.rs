//! Core traits for the reconciler
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`ResourceAdapter`]: Per-kind translation between spec and provider
//! - [`RdsApi`]: Managed-database provider binding
//! - [`ObjectStore`]: Declared objects, status commits and change events
//! - [`Clock`]: Source of readiness timestamps

pub mod adapter;
pub mod clock;
pub mod object_store;
pub mod rds_api;

pub use adapter::{ResourceAdapter, ResourceRemover};
pub use clock::{Clock, ManualClock, SystemClock};
pub use object_store::{ObjectStore, ObjectStoreFactory, StoreEvent};
pub use rds_api::{
    ApplyMethod, CreateDbClusterInput, CreateDbInstanceInput, CreateDbSubnetGroupInput,
    CreateParameterGroupInput, DbCluster, DbInstance, DbParameterGroup, DbSubnetGroup,
    DeleteDbClusterInput, DeleteDbInstanceInput, ModifyDbClusterInput, ModifyDbInstanceInput,
    ModifyDbSubnetGroupInput, ModifyParameterGroupInput, ParameterChange, ParameterGroupScope,
    RdsApi, RdsApiFactory, STATUS_AVAILABLE,
};
