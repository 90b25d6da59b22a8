//! Declared-object model
//!
//! - [`Manifest`]: the desired spec of one declared object (immutable during a pass)
//! - [`ObjectStatus`]: the observed status, the only data a pass mutates
//! - [`StoredObject`]: what the object store hands to the dispatcher

pub mod object;
pub mod spec;
pub mod status;

pub use object::{ObjectKey, ObjectKind, ResourceKind, StoredObject};
pub use spec::{
    ClusterSpec, DeletionSpec, InstanceSpec, Manifest, Parameter, ParameterGroupSpec,
    SubnetGroupSpec,
};
pub use status::{
    DeletionState, DeletionStatus, LifecycleState, LifecycleStatus, ObjectStatus,
    ResolvedAttributes,
};
