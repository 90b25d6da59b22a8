//! Readiness stabilization
//!
//! Debounces the provider's "is it ready" signal: a resource is promoted to
//! `provisioned` only after it has been observed ready continuously for the
//! stabilization duration. A single not-ready probe restarts the count.
//! Only the positive edge is debounced.

use std::time::Duration;

use crate::types::LifecycleState;

/// Outcome of one readiness probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stabilized {
    /// New `ready_since` (Unix ms, `0` = not ready)
    pub ready_since: i64,
    /// `Provisioning` or `Provisioned`
    pub state: LifecycleState,
}

/// Fold one readiness probe into the readiness timestamp
///
/// All times are Unix milliseconds. Promotion happens when
/// `now - ready_since >= stabilization`; a clock that moved backwards
/// counts as zero elapsed time. A first ready probe at or before the epoch
/// stamps `1`, since `0` means "not ready".
pub fn stabilize(ready_since: i64, ready_now: bool, now: i64, stabilization: Duration) -> Stabilized {
    if !ready_now {
        return Stabilized {
            ready_since: 0,
            state: LifecycleState::Provisioning,
        };
    }

    if ready_since == 0 {
        return Stabilized {
            ready_since: now.max(1),
            state: LifecycleState::Provisioning,
        };
    }

    let elapsed = now.saturating_sub(ready_since).max(0);
    let required = i64::try_from(stabilization.as_millis()).unwrap_or(i64::MAX);
    let state = if elapsed >= required {
        LifecycleState::Provisioned
    } else {
        LifecycleState::Provisioning
    };

    Stabilized { ready_since, state }
}
