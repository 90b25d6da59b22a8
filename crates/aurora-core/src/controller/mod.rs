//! Reference dispatcher
//!
//! The Controller owns timing for the engines: it decides when each declared
//! object is reconciled next and commits what the engines return.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐
//! │ ObjectStore  │─── StoreEvent ───┐
//! └──────────────┘                  │
//!        ▲                          ▼
//!        │                  ┌──────────────┐      ┌──────────────┐
//!        │  update_status   │  Controller  │◄─────│  due timer   │
//!        └──────────────────│ (one pass at │      └──────────────┘
//!                           │  a time)     │
//!                           └──────────────┘
//!                                   │
//!              ┌────────────────────┼────────────────────┐
//!              ▼                    ▼                    ▼
//!     ┌────────────────┐   ┌────────────────┐   ┌──────────────┐
//!     │LifecycleEngine │   │ DeletionEngine │   │    Events    │
//!     │  (per kind)    │   │  (+ guard)     │   │  (notify)    │
//!     └────────────────┘   └────────────────┘   └──────────────┘
//! ```
//!
//! ## Pass Flow
//!
//! 1. Object becomes due (store event, requeue timer, or startup). A watcher
//!    that fell behind relists the store and makes every object due
//! 2. Read the object; for deletion requests also snapshot every object for the guard
//! 3. Run the engine for the object's kind
//! 4. Commit the new status against the version that was read
//! 5. Schedule the next pass: the returned delay, immediately after a state
//!    change, or `resync_secs` otherwise

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tokio_stream::StreamExt;
use tracing::{debug, error, info, warn};

use crate::adapters::{
    ClusterAdapter, InstanceAdapter, ParameterGroupAdapter, RdsAdapters, SubnetGroupAdapter,
};
use crate::config::EngineConfig;
use crate::engine::{DeletionEngine, LifecycleEngine, PassContext, Reconciled};
use crate::error::{Error, ReconcileError, Result};
use crate::traits::{Clock, ObjectStore, StoreEvent};
use crate::types::{
    DeletionState, LifecycleStatus, Manifest, ObjectKey, ObjectStatus, StoredObject,
};

/// Events emitted by the Controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    /// Controller started with this many declared objects
    Started { objects: usize },

    /// A pass completed and its status was committed
    PassSucceeded {
        key: ObjectKey,
        state: String,
        requeue_after: Duration,
    },

    /// A pass failed; the status was left untouched
    PassFailed {
        key: ObjectKey,
        error: String,
        requeue_after: Duration,
    },

    /// Status commit lost an optimistic-concurrency race; the pass is retried
    StatusConflict { key: ObjectKey },

    /// The declared object was removed from the store
    Deleted { key: ObjectKey },

    /// Controller stopped
    Stopped { reason: String },
}

/// Due times per declared object
#[derive(Debug, Default)]
struct WorkQueue {
    due: HashMap<ObjectKey, Instant>,
}

impl WorkQueue {
    /// Schedule `key` at `at`, keeping an earlier due time if one exists
    fn schedule(&mut self, key: ObjectKey, at: Instant) {
        self.due
            .entry(key)
            .and_modify(|due| *due = (*due).min(at))
            .or_insert(at);
    }

    fn forget(&mut self, key: &ObjectKey) {
        self.due.remove(key);
    }

    fn next_due(&self) -> Option<Instant> {
        self.due.values().min().copied()
    }

    /// Remove and return every key due at `now`, earliest first
    fn take_due(&mut self, now: Instant) -> Vec<ObjectKey> {
        let mut ready: Vec<(Instant, ObjectKey)> = self
            .due
            .iter()
            .filter(|(_, at)| **at <= now)
            .map(|(key, at)| (*at, key.clone()))
            .collect();
        ready.sort();
        for (_, key) in &ready {
            self.due.remove(key);
        }
        ready.into_iter().map(|(_, key)| key).collect()
    }

    fn len(&self) -> usize {
        self.due.len()
    }
}

/// Reconciles every declared object in one store
///
/// ## Lifecycle
///
/// 1. Create with [`Controller::new()`]
/// 2. Start with [`Controller::run()`]
/// 3. Controller runs until a shutdown signal is received
/// 4. The store is flushed before `run` returns
///
/// ## Serialization
///
/// Passes run one at a time on the calling task, so no object is ever
/// reconciled concurrently with itself.
pub struct Controller {
    store: Arc<dyn ObjectStore>,
    clock: Arc<dyn Clock>,

    clusters: LifecycleEngine<ClusterAdapter>,
    instances: LifecycleEngine<InstanceAdapter>,
    parameter_groups: LifecycleEngine<ParameterGroupAdapter>,
    cluster_parameter_groups: LifecycleEngine<ParameterGroupAdapter>,
    subnet_groups: LifecycleEngine<SubnetGroupAdapter>,
    deletions: DeletionEngine,

    /// Delay when a pass returns none and nothing changed
    resync: Duration,

    /// Delay after a store failure outside any engine
    error_requeue: Duration,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<ControllerEvent>,
}

impl Controller {
    /// Create a new controller
    ///
    /// # Returns
    ///
    /// A tuple of (controller, event_receiver) where event_receiver yields controller events
    pub fn new(
        store: Arc<dyn ObjectStore>,
        adapters: RdsAdapters,
        clock: Arc<dyn Clock>,
        config: &EngineConfig,
    ) -> Result<(Self, mpsc::Receiver<ControllerEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let controller = Self {
            store,
            clock,
            clusters: LifecycleEngine::new(adapters.cluster.clone(), config),
            instances: LifecycleEngine::new(adapters.instance.clone(), config),
            parameter_groups: LifecycleEngine::new(adapters.parameter_group.clone(), config),
            cluster_parameter_groups: LifecycleEngine::new(
                adapters.cluster_parameter_group.clone(),
                config,
            ),
            subnet_groups: LifecycleEngine::new(adapters.subnet_group.clone(), config),
            deletions: DeletionEngine::new(adapters.removers(), config),
            resync: config.resync(),
            error_requeue: Duration::from_secs(config.error_requeue_secs),
            event_tx: tx,
        };

        Ok((controller, rx))
    }

    /// Run the controller until SIGINT
    pub async fn run(&self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Run the controller until `shutdown_rx` fires (or its sender is dropped)
    ///
    /// Used by tests and by embedders that own their own signal handling.
    pub async fn run_with_shutdown(&self, shutdown_rx: oneshot::Receiver<()>) -> Result<()> {
        self.run_internal(Some(shutdown_rx)).await
    }

    async fn run_internal(&self, shutdown_rx: Option<oneshot::Receiver<()>>) -> Result<()> {
        // Subscribe before listing so nothing applied in between is missed
        let mut store_events = self.store.watch();

        let objects = self.store.list(None).await?;
        self.emit_event(ControllerEvent::Started {
            objects: objects.len(),
        });
        info!("Controller started with {} object(s)", objects.len());

        let mut queue = WorkQueue::default();
        let now = Instant::now();
        for object in objects {
            queue.schedule(object.key, now);
        }

        let shutdown = async move {
            match shutdown_rx {
                Some(rx) => {
                    let _ = rx.await;
                }
                None => {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        error!("Failed to listen for shutdown signal: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            }
        };
        tokio::pin!(shutdown);

        loop {
            let next_due = queue.next_due();
            let timer = async {
                match next_due {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    self.emit_event(ControllerEvent::Stopped {
                        reason: "Shutdown signal".to_string(),
                    });
                    break;
                }

                Some(event) = store_events.next() => {
                    self.handle_store_event(event, &mut queue).await;
                }

                _ = timer => {
                    for key in queue.take_due(Instant::now()) {
                        let delay = self.dispatch(&key).await;
                        if let Some(delay) = delay {
                            queue.schedule(key, Instant::now() + delay);
                        }
                    }
                    debug!("{} object(s) scheduled", queue.len());
                }
            }
        }

        // Flush state before exiting
        self.store.flush().await?;
        info!("Store flushed, controller stopped");

        Ok(())
    }

    async fn handle_store_event(&self, event: StoreEvent, queue: &mut WorkQueue) {
        match event {
            StoreEvent::Applied(key) => {
                debug!("{} applied", key);
                queue.schedule(key, Instant::now());
            }
            StoreEvent::Deleted(key) => {
                debug!("{} removed from store", key);
                queue.forget(&key);
                self.emit_event(ControllerEvent::Deleted { key });
            }
            StoreEvent::Resync => match self.store.list(None).await {
                Ok(objects) => {
                    warn!("Store events dropped, rescheduling {} object(s)", objects.len());
                    let now = Instant::now();
                    for object in objects {
                        queue.schedule(object.key, now);
                    }
                }
                Err(e) => error!("Failed to relist store after dropped events: {}", e),
            },
        }
    }

    /// Run one pass, turning store failures into a retry
    async fn dispatch(&self, key: &ObjectKey) -> Option<Duration> {
        match self.reconcile_key(key).await {
            Ok(delay) => delay,
            Err(e) => {
                error!("Failed to reconcile {}: {}", key, e);
                self.emit_event(ControllerEvent::PassFailed {
                    key: key.clone(),
                    error: e.to_string(),
                    requeue_after: self.error_requeue,
                });
                Some(self.error_requeue)
            }
        }
    }

    /// Run exactly one reconcile pass for one object
    ///
    /// # Returns
    ///
    /// - `Ok(Some(delay))`: the object should be reconciled again after `delay`
    /// - `Ok(None)`: nothing left to do (object gone, or deletion completed)
    /// - `Err(Error)`: the store failed; engine failures are not errors here
    ///   and come back as a delay instead
    pub async fn reconcile_key(&self, key: &ObjectKey) -> Result<Option<Duration>> {
        let Some(object) = self.store.get(key).await? else {
            debug!("{} no longer exists", key);
            return Ok(None);
        };

        let ctx = PassContext::new(key.clone(), self.clock.now_millis());
        let outcome = match self.run_engine(&object, &ctx).await? {
            Ok(reconciled) => reconciled,
            Err(failure) => {
                warn!(parent: &ctx.span, "pass failed: {}", failure);
                self.emit_event(ControllerEvent::PassFailed {
                    key: key.clone(),
                    error: failure.source.to_string(),
                    requeue_after: failure.requeue_after,
                });
                return Ok(Some(failure.requeue_after));
            }
        };

        let changed = outcome.status != object.status;
        if changed {
            match self
                .store
                .update_status(key, object.resource_version, outcome.status.clone())
                .await
            {
                Ok(_) => {}
                Err(e) if e.is_conflict() => {
                    warn!(parent: &ctx.span, "status not committed: {}", e);
                    self.emit_event(ControllerEvent::StatusConflict { key: key.clone() });
                    return Ok(Some(Duration::ZERO));
                }
                Err(e) => return Err(e),
            }
        }

        let delay = match outcome.requeue_after {
            Some(delay) => delay,
            None if changed => Duration::ZERO,
            None => self.resync,
        };

        self.emit_event(ControllerEvent::PassSucceeded {
            key: key.clone(),
            state: outcome.status.state_name().to_string(),
            requeue_after: delay,
        });

        if let ObjectStatus::Deletion(status) = &outcome.status {
            if status.state == DeletionState::Completed {
                debug!(parent: &ctx.span, "deletion finished, not requeuing");
                return Ok(None);
            }
        }

        Ok(Some(delay))
    }

    /// Dispatch to the engine for the object's kind
    ///
    /// The outer `Result` is a store failure; the inner one is the engine's.
    async fn run_engine(
        &self,
        object: &StoredObject,
        ctx: &PassContext,
    ) -> Result<std::result::Result<Reconciled<ObjectStatus>, ReconcileError>> {
        let lifecycle = |r: Reconciled<LifecycleStatus>| r.map(ObjectStatus::Lifecycle);

        let outcome = match (&object.manifest, &object.status) {
            (Manifest::Cluster(spec), ObjectStatus::Lifecycle(status)) => {
                self.clusters.reconcile(spec, status, ctx).await.map(lifecycle)
            }
            (Manifest::Instance(spec), ObjectStatus::Lifecycle(status)) => {
                self.instances.reconcile(spec, status, ctx).await.map(lifecycle)
            }
            (Manifest::ParameterGroup(spec), ObjectStatus::Lifecycle(status)) => self
                .parameter_groups
                .reconcile(spec, status, ctx)
                .await
                .map(lifecycle),
            (Manifest::ClusterParameterGroup(spec), ObjectStatus::Lifecycle(status)) => self
                .cluster_parameter_groups
                .reconcile(spec, status, ctx)
                .await
                .map(lifecycle),
            (Manifest::SubnetGroup(spec), ObjectStatus::Lifecycle(status)) => self
                .subnet_groups
                .reconcile(spec, status, ctx)
                .await
                .map(lifecycle),
            (Manifest::Deletion(spec), ObjectStatus::Deletion(status)) => {
                let snapshot = self.store.list(None).await?;
                self.deletions
                    .reconcile(spec, status, &snapshot, ctx)
                    .await
                    .map(|r| r.map(ObjectStatus::Deletion))
            }
            _ => {
                return Err(Error::invalid_input(format!(
                    "status of {} does not match its kind",
                    object.key
                )));
            }
        };

        Ok(outcome)
    }

    /// Emit a controller event
    fn emit_event(&self, event: ControllerEvent) {
        // Send event, logging warning if channel is full (backpressure)
        if self.event_tx.try_send(event).is_err() {
            warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ObjectKind;

    #[test]
    fn earlier_due_time_wins() {
        let mut queue = WorkQueue::default();
        let key = ObjectKey::new(ObjectKind::Cluster, "db1");
        let now = Instant::now();

        queue.schedule(key.clone(), now + Duration::from_secs(30));
        queue.schedule(key.clone(), now);
        queue.schedule(key.clone(), now + Duration::from_secs(10));

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.next_due(), Some(now));
    }

    #[test]
    fn take_due_returns_only_due_keys_in_order() {
        let mut queue = WorkQueue::default();
        let now = Instant::now();
        let a = ObjectKey::new(ObjectKind::Cluster, "a");
        let b = ObjectKey::new(ObjectKind::Instance, "b");
        let c = ObjectKey::new(ObjectKind::Deletion, "c");

        queue.schedule(b.clone(), now);
        queue.schedule(a.clone(), now - Duration::from_millis(5));
        queue.schedule(c.clone(), now + Duration::from_secs(1));

        assert_eq!(queue.take_due(now), vec![a, b]);
        assert_eq!(queue.next_due(), Some(now + Duration::from_secs(1)));

        queue.forget(&c);
        assert_eq!(queue.next_due(), None);
    }
}
