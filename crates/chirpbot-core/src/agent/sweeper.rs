//! Deferred callback sweeper.
//!
//! Every tick, each due timer is deleted first and only then handed to its
//! module's timeout callback. The delete is compare-and-delete: a sweeper
//! that loses the race for a row skips it, so a timer fires at most once
//! even with two sweepers or a restart in the middle of a tick.

use std::sync::Arc;
use std::time::Duration;

use chirpbot_types::error::{HookError, RepositoryError};
use chirpbot_types::timer::DeferredCallback;
use chrono::Utc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::agent::MIN_TICK;
use crate::module::HookRegistry;
use crate::repository::BoxStore;

/// Counts from one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Callbacks invoked (including ones that then failed).
    pub fired: usize,
    /// Rows consumed whose module has no timeout callback.
    pub misfired: usize,
}

#[derive(Clone)]
pub struct Sweeper {
    store: BoxStore,
    registry: Arc<HookRegistry>,
}

impl Sweeper {
    pub fn new(store: BoxStore, registry: Arc<HookRegistry>) -> Self {
        Self { store, registry }
    }

    /// Fire every timer due at `now_ms`, in store order.
    pub async fn sweep(&self, now_ms: i64) -> Result<SweepReport, RepositoryError> {
        let mut report = SweepReport::default();

        for timer in self.store.list_timers().await? {
            if !timer.is_due(now_ms) {
                continue;
            }
            if !self.store.take_timer(&timer.id).await? {
                debug!(id = %timer.id, "timer already taken");
                continue;
            }
            info!(module = %timer.module, id = %timer.id, "timer expired");

            match self.fire(timer).await {
                Ok(()) => report.fired += 1,
                Err(HookError::NoTimeoutCallback(module)) => {
                    error!(%module, "timer consumed but module has no timeout callback");
                    report.misfired += 1;
                }
                Err(e) => {
                    warn!(error = %e, "timeout callback failed");
                    report.fired += 1;
                }
            }
        }

        Ok(report)
    }

    async fn fire(&self, timer: DeferredCallback) -> Result<(), HookError> {
        let callback = self
            .registry
            .timeout_callback(&timer.module)
            .ok_or_else(|| HookError::NoTimeoutCallback(timer.module.clone()))?;

        // Spawned so a panicking callback cannot take the sweeper down with it.
        let task = tokio::spawn(callback(timer.data));
        match task.await {
            Ok(result) => result.map_err(|source| HookError::Failed {
                module: timer.module,
                source,
            }),
            Err(join) => Err(HookError::Failed {
                module: timer.module,
                source: anyhow::anyhow!("timeout callback panicked: {join}"),
            }),
        }
    }

    /// Sweep immediately, then every `period`, until `cancel` fires.
    pub async fn run(self, period: Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(period.max(MIN_TICK));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(e) = self.sweep(Utc::now().timestamp_millis()).await {
                        warn!(error = %e, "timer sweep failed");
                    }
                }
            }
        }
        debug!("sweeper stopped");
    }
}

impl std::fmt::Debug for Sweeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sweeper").finish_non_exhaustive()
    }
}
