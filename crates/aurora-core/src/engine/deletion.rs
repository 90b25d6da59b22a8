//! Deletion engine: `"" → created → executing → completed`

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{Instrument, debug, info};

use super::{PassContext, Reconciled, RequeuePolicy};
use crate::config::EngineConfig;
use crate::error::{Error, ReconcileError};
use crate::guard;
use crate::traits::ResourceRemover;
use crate::types::{DeletionSpec, DeletionState, DeletionStatus, ResourceKind, StoredObject};

/// Drives deletion requests for any resource kind
pub struct DeletionEngine {
    removers: HashMap<ResourceKind, Arc<dyn ResourceRemover>>,
    policy: RequeuePolicy,
}

impl DeletionEngine {
    pub fn new(
        removers: impl IntoIterator<Item = Arc<dyn ResourceRemover>>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            removers: removers
                .into_iter()
                .map(|r| (r.resource_kind(), r))
                .collect(),
            policy: RequeuePolicy::from(config),
        }
    }

    /// Run one reconcile pass
    ///
    /// `snapshot` is the current set of declared objects; the deletion guard
    /// scans it before the delete call is issued.
    pub async fn reconcile(
        &self,
        spec: &DeletionSpec,
        status: &DeletionStatus,
        snapshot: &[StoredObject],
        ctx: &PassContext,
    ) -> Result<Reconciled<DeletionStatus>, ReconcileError> {
        self.step(spec, status, snapshot)
            .instrument(ctx.span.clone())
            .await
    }

    async fn step(
        &self,
        spec: &DeletionSpec,
        status: &DeletionStatus,
        snapshot: &[StoredObject],
    ) -> Result<Reconciled<DeletionStatus>, ReconcileError> {
        debug!("current state is '{}'", status.state);
        match status.state {
            DeletionState::NoState => Ok(Reconciled::now(transition(DeletionState::Created))),
            DeletionState::Created => {
                guard::check(spec.kind, &spec.identifier, snapshot)
                    .map_err(|e| self.policy.fail(e))?;

                let remover = self.remover(spec.kind)?;
                match remover.remove(&spec.identifier).await {
                    Ok(()) => {}
                    Err(e) if e.is_not_found() => {}
                    Err(e) => return Err(self.policy.fail(e)),
                }
                info!("Delete issued for {} {}", spec.kind, spec.identifier);
                Ok(Reconciled::now(transition(DeletionState::Executing)))
            }
            DeletionState::Executing => {
                let remover = self.remover(spec.kind)?;
                let exists = remover
                    .exists(&spec.identifier)
                    .await
                    .map_err(|e| self.policy.fail(e))?;
                if exists {
                    debug!("waiting for {} {} to disappear", spec.kind, spec.identifier);
                    Ok(Reconciled::after(status.clone(), self.policy.poll))
                } else {
                    info!("{} {} deleted", spec.kind, spec.identifier);
                    Ok(Reconciled::now(transition(DeletionState::Completed)))
                }
            }
            DeletionState::Completed => Ok(Reconciled::now(status.clone())),
        }
    }

    fn remover(&self, kind: ResourceKind) -> Result<&Arc<dyn ResourceRemover>, ReconcileError> {
        self.removers.get(&kind).ok_or_else(|| {
            self.policy
                .fail(Error::config(format!("no adapter registered for {}", kind)))
        })
    }
}

fn transition(state: DeletionState) -> DeletionStatus {
    debug!("setting state to {}", state);
    DeletionStatus { state }
}
