//! Reconciliation engines
//!
//! One pass of an engine takes a desired spec and the last committed status
//! and returns the next status plus a suggested redelivery delay. Engines
//! never sleep or loop; waiting is always expressed as a requeue delay.
//!
//! ## State Machines
//!
//! ```text
//! lifecycle:  "" ──► unprovisioned ──► provisioning ──► provisioned
//!                         ▲                 │                │
//!                         └─────────────────┴──── drift ─────┘
//!
//! deletion:   "" ──► created ──(guard)──► executing ──► completed
//! ```
//!
//! ## Requeue Policy
//!
//! | Outcome | Delay |
//! |---|---|
//! | any error | `error_requeue_secs` (1) |
//! | deletion blocked by a dependent | `blocked_requeue_secs` (5) |
//! | polling `provisioning` / `executing` | `poll_requeue_secs` (10) |
//! | anything else | none (dispatcher default) |

mod deletion;
mod lifecycle;

pub use deletion::DeletionEngine;
pub use lifecycle::LifecycleEngine;

use std::time::Duration;
use tracing::Span;

use crate::config::EngineConfig;
use crate::error::{Error, ReconcileError};
use crate::types::ObjectKey;

/// Successful pass result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled<S> {
    /// Status to commit
    pub status: S,
    /// Suggested delay before the next pass; `None` = dispatcher default
    pub requeue_after: Option<Duration>,
}

impl<S> Reconciled<S> {
    fn now(status: S) -> Self {
        Self {
            status,
            requeue_after: None,
        }
    }

    fn after(status: S, delay: Duration) -> Self {
        Self {
            status,
            requeue_after: Some(delay),
        }
    }

    /// Convert the status, keeping the delay
    pub fn map<T>(self, f: impl FnOnce(S) -> T) -> Reconciled<T> {
        Reconciled {
            status: f(self.status),
            requeue_after: self.requeue_after,
        }
    }
}

/// Redelivery delays returned by the engines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequeuePolicy {
    pub on_error: Duration,
    pub on_blocked: Duration,
    pub poll: Duration,
}

impl RequeuePolicy {
    /// Wrap an error with the delay its class calls for
    pub fn fail(&self, source: Error) -> ReconcileError {
        let delay = if source.is_blocked() {
            self.on_blocked
        } else {
            self.on_error
        };
        ReconcileError::new(source, delay)
    }
}

impl Default for RequeuePolicy {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for RequeuePolicy {
    fn from(config: &EngineConfig) -> Self {
        Self {
            on_error: Duration::from_secs(config.error_requeue_secs),
            on_blocked: Duration::from_secs(config.blocked_requeue_secs),
            poll: Duration::from_secs(config.poll_requeue_secs),
        }
    }
}

/// Per-pass context handed into every reconcile call
///
/// Carries the object identity for log correlation and the pass's notion of
/// "now" (Unix ms), so every timestamp written during one pass agrees.
#[derive(Debug, Clone)]
pub struct PassContext {
    pub key: ObjectKey,
    pub now: i64,
    pub span: Span,
}

impl PassContext {
    pub fn new(key: ObjectKey, now: i64) -> Self {
        let span = tracing::info_span!("reconcile", kind = %key.kind, name = %key.name);
        Self { key, now, span }
    }
}
