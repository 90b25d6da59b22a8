//! Lifecycle engine: `"" → unprovisioned → provisioning → provisioned`

use std::sync::Arc;
use std::time::Duration;
use tracing::{Instrument, debug, warn};

use super::{PassContext, Reconciled, RequeuePolicy};
use crate::config::EngineConfig;
use crate::error::ReconcileError;
use crate::stabilizer::stabilize;
use crate::traits::ResourceAdapter;
use crate::types::{LifecycleState, LifecycleStatus, ResolvedAttributes};

/// Drives one lifecycle object per call, generic over the resource kind
pub struct LifecycleEngine<A> {
    adapter: Arc<A>,
    stabilization: Duration,
    policy: RequeuePolicy,
}

impl<A> LifecycleEngine<A>
where
    A: ResourceAdapter,
{
    pub fn new(adapter: Arc<A>, config: &EngineConfig) -> Self {
        Self {
            adapter,
            stabilization: config.stabilization(),
            policy: RequeuePolicy::from(config),
        }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Run one reconcile pass
    ///
    /// On error the input status is to be kept as-is; the returned error
    /// carries the retry delay.
    pub async fn reconcile(
        &self,
        spec: &A::Spec,
        status: &LifecycleStatus,
        ctx: &PassContext,
    ) -> Result<Reconciled<LifecycleStatus>, ReconcileError> {
        self.step(spec, status, ctx)
            .instrument(ctx.span.clone())
            .await
    }

    async fn step(
        &self,
        spec: &A::Spec,
        status: &LifecycleStatus,
        ctx: &PassContext,
    ) -> Result<Reconciled<LifecycleStatus>, ReconcileError> {
        debug!("current state is '{}'", status.state);
        match status.state {
            LifecycleState::NoState => Ok(Reconciled::now(transition(
                status,
                LifecycleState::Unprovisioned,
            ))),
            LifecycleState::Unprovisioned => self.provision(spec, status).await,
            LifecycleState::Provisioning => self.await_ready(spec, status, ctx).await,
            LifecycleState::Provisioned => self.verify(spec, status).await,
        }
    }

    /// Make sure the resource exists and carries the spec
    async fn provision(
        &self,
        spec: &A::Spec,
        status: &LifecycleStatus,
    ) -> Result<Reconciled<LifecycleStatus>, ReconcileError> {
        let identifier = self.adapter.identifier(spec);
        let existing = self
            .adapter
            .find_existing(identifier)
            .await
            .map_err(|e| self.policy.fail(e))?;

        match existing {
            None => {
                self.adapter
                    .create(spec)
                    .await
                    .map_err(|e| self.policy.fail(e))?;
            }
            Some(resource) if self.adapter.is_ready(&resource) => {
                self.adapter
                    .apply_desired(&resource, spec)
                    .await
                    .map_err(|e| self.policy.fail(e))?;
            }
            Some(resource) => {
                debug!(?resource, "resource is mid-transition, not updating");
            }
        }

        let mut next = transition(status, LifecycleState::Provisioning);
        next.ready_since = 0;
        next.resolved = ResolvedAttributes::default();
        Ok(Reconciled::now(next))
    }

    /// Debounce readiness until the resource has been ready long enough
    async fn await_ready(
        &self,
        spec: &A::Spec,
        status: &LifecycleStatus,
        ctx: &PassContext,
    ) -> Result<Reconciled<LifecycleStatus>, ReconcileError> {
        let identifier = self.adapter.identifier(spec);
        let existing = self
            .adapter
            .find_existing(identifier)
            .await
            .map_err(|e| self.policy.fail(e))?;

        let Some(resource) = existing else {
            warn!("{} {} disappeared while provisioning", self.adapter.kind(), identifier);
            return Ok(Reconciled::after(regress(status), self.policy.poll));
        };

        let ready = self.adapter.is_ready(&resource);
        debug!(ready, "db resource readiness probed");
        let outcome = stabilize(status.ready_since, ready, ctx.now, self.stabilization);

        let mut next = transition(status, outcome.state);
        next.ready_since = outcome.ready_since;
        if outcome.state == LifecycleState::Provisioned {
            next.resolved = self.adapter.resolve(&resource);
        } else if ready {
            debug!("waiting for db resource to be ready for minimum time");
        }
        Ok(Reconciled::after(next, self.policy.poll))
    }

    /// Re-check a provisioned resource for drift and readiness
    async fn verify(
        &self,
        spec: &A::Spec,
        status: &LifecycleStatus,
    ) -> Result<Reconciled<LifecycleStatus>, ReconcileError> {
        let identifier = self.adapter.identifier(spec);
        let existing = self
            .adapter
            .find_existing(identifier)
            .await
            .map_err(|e| self.policy.fail(e))?;

        let Some(resource) = existing else {
            warn!("{} {} no longer exists", self.adapter.kind(), identifier);
            return Ok(Reconciled::now(regress(status)));
        };

        let mismatches = self.adapter.validate(&resource, spec);
        if !mismatches.is_empty() {
            warn!(?mismatches, "drift detected");
            return Ok(Reconciled::now(regress(status)));
        }

        if !self.adapter.is_ready(&resource) {
            warn!("db resource is no longer ready");
            return Ok(Reconciled::now(regress(status)));
        }

        let mut next = status.clone();
        next.resolved = self.adapter.resolve(&resource);
        Ok(Reconciled::now(next))
    }
}

fn transition(status: &LifecycleStatus, state: LifecycleState) -> LifecycleStatus {
    if status.state != state {
        debug!("setting state to {}", state);
    }
    LifecycleStatus {
        state,
        ..status.clone()
    }
}

/// Back to `unprovisioned` with readiness and resolved attributes cleared
fn regress(status: &LifecycleStatus) -> LifecycleStatus {
    let mut next = transition(status, LifecycleState::Unprovisioned);
    next.ready_since = 0;
    next.resolved = ResolvedAttributes::default();
    next
}
