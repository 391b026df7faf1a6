//! Liveness heartbeat: records `last_waking_at` so the next start can tell
//! how long the process was down.

use std::time::Duration;

use chirpbot_types::meta::MetaPatch;
use chrono::Utc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::agent::MIN_TICK;
use crate::agent::handle::AgentHandle;

/// Write the current time into process meta every `period` until cancelled.
///
/// The first write happens one full period after start.
pub async fn run_heartbeat(agent: AgentHandle, period: Duration, cancel: CancellationToken) {
    let period = period.max(MIN_TICK);
    let start = tokio::time::Instant::now() + period;
    let mut ticker = tokio::time::interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => beat(&agent).await,
        }
    }
    debug!("heartbeat stopped");
}

async fn beat(agent: &AgentHandle) {
    let now = Utc::now().timestamp_millis();
    match agent.update_meta(MetaPatch::waking_at(now)).await {
        Ok(_) => debug!(last_waking_at = now, "heartbeat"),
        Err(e) => warn!(error = %e, "failed to record heartbeat"),
    }
}
