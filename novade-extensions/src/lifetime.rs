//! Idle shutdown of the service process.
//!
//! The service exits once `idle_timeout` has passed since the last hold was
//! released. Calls in progress and an open preferences dialog are holds.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::{sleep_until, Instant};

struct LifetimeState {
    holds: usize,
    last_activity: Instant,
}

pub struct ServiceLifetime {
    state: Mutex<LifetimeState>,
    changed: Notify,
    idle_timeout: Duration,
}

impl ServiceLifetime {
    pub fn new(idle_timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(LifetimeState { holds: 0, last_activity: Instant::now() }),
            changed: Notify::new(),
            idle_timeout,
        })
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Keeps the service alive until the returned guard is dropped.
    pub fn hold(self: &Arc<Self>) -> HoldGuard {
        {
            let mut state = self.state.lock();
            state.holds += 1;
            tracing::debug!("Service hold taken ({} active)", state.holds);
        }
        self.changed.notify_waiters();
        HoldGuard { lifetime: Arc::clone(self) }
    }

    fn release(&self) {
        {
            let mut state = self.state.lock();
            state.holds = state.holds.saturating_sub(1);
            state.last_activity = Instant::now();
            tracing::debug!("Service hold released ({} active)", state.holds);
        }
        self.changed.notify_waiters();
    }

    pub fn hold_count(&self) -> usize {
        self.state.lock().holds
    }

    /// Resolves once no hold exists and none was released for `idle_timeout`.
    pub async fn wait_for_idle(&self) {
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let deadline = {
                let state = self.state.lock();
                (state.holds == 0).then(|| state.last_activity + self.idle_timeout)
            };

            match deadline {
                None => notified.await,
                Some(deadline) if Instant::now() >= deadline => return,
                Some(deadline) => {
                    tokio::select! {
                        _ = &mut notified => {}
                        _ = sleep_until(deadline) => {}
                    }
                }
            }
        }
    }
}

impl fmt::Debug for ServiceLifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceLifetime")
            .field("holds", &self.hold_count())
            .field("idle_timeout", &self.idle_timeout)
            .finish()
    }
}

/// Releases its hold exactly once, when dropped.
#[must_use = "the hold is released as soon as the guard is dropped"]
pub struct HoldGuard {
    lifetime: Arc<ServiceLifetime>,
}

impl fmt::Debug for HoldGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HoldGuard").finish_non_exhaustive()
    }
}

impl Drop for HoldGuard {
    fn drop(&mut self) {
        self.lifetime.release();
    }
}
