//! Agent runtime: boot sequence and task lifecycle.
//!
//! `boot` resolves the agent's identity, reads the previous heartbeat and
//! installs modules. `start` then spawns the intake loop, sweeper and
//! heartbeat under one cancellation token; `shutdown` stops them together.

use std::sync::Arc;

use chirpbot_types::config::AgentSettings;
use chirpbot_types::error::StartupError;
use chirpbot_types::meta::ProcessMeta;
use chirpbot_types::note::StreamEvent;
use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::agent::handle::AgentHandle;
use crate::agent::heartbeat::run_heartbeat;
use crate::agent::retry::fetch_identity;
use crate::agent::router::EventRouter;
use crate::agent::sweeper::Sweeper;
use crate::api::BoxSocialApi;
use crate::module::{AgentModule, HookRegistry};
use crate::repository::BoxStore;

pub struct Runtime {
    router: EventRouter,
    sweeper: Sweeper,
    settings: Arc<AgentSettings>,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl Runtime {
    /// Prepare the agent. Fails if the identity cannot be fetched or the
    /// store cannot be read; nothing is routed in that case.
    pub async fn boot(
        store: BoxStore,
        api: BoxSocialApi,
        settings: AgentSettings,
        modules: Vec<Box<dyn AgentModule>>,
    ) -> Result<Self, StartupError> {
        settings.validate()?;
        let account = fetch_identity(
            &api,
            settings.identity_fetch_attempts,
            settings.identity_retry_base(),
        )
        .await?;

        let last_sleeped_at = match store.load_meta().await? {
            Some(meta) => Some(meta.last_waking_at),
            None => {
                store
                    .save_meta(&ProcessMeta::new(Utc::now().timestamp_millis()))
                    .await?;
                None
            }
        };
        if let Some(at) = last_sleeped_at {
            info!(last_sleeped_at = at, "previous run last seen alive");
        }

        let agent = AgentHandle::new(account, last_sleeped_at, store.clone(), api);
        let registry = Arc::new(HookRegistry::install(modules, &agent));
        let settings = Arc::new(settings);

        Ok(Self {
            router: EventRouter::new(agent, Arc::clone(&registry), Arc::clone(&settings)),
            sweeper: Sweeper::new(store, registry),
            settings,
            cancel: CancellationToken::new(),
            tasks: Vec::new(),
        })
    }

    pub fn agent(&self) -> &AgentHandle {
        self.router.agent()
    }

    pub fn router(&self) -> &EventRouter {
        &self.router
    }

    /// Token cancelled on shutdown. Share it with the stream producer.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Spawn the intake loop, the sweeper and the heartbeat.
    pub fn start(&mut self, events: mpsc::Receiver<StreamEvent>) {
        self.tasks.push(tokio::spawn(intake_loop(
            self.router.clone(),
            events,
            self.cancel.clone(),
        )));
        self.tasks.push(tokio::spawn(
            self.sweeper.clone().run(self.settings.sweep_interval(), self.cancel.clone()),
        ));
        self.tasks.push(tokio::spawn(run_heartbeat(
            self.router.agent().clone(),
            self.settings.heartbeat_interval(),
            self.cancel.clone(),
        )));
        info!(account = %self.agent().account().acct(), "agent is now running");
    }

    /// Resolves once shutdown has been requested.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await;
    }

    /// Cancel every task and wait for them to stop.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        for task in self.tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "runtime task ended abnormally");
            }
        }
        info!("agent stopped");
    }
}

/// Each event is handled in its own task so a panicking hook only loses
/// that event. Dispatches still in flight when the loop stops are awaited
/// before it returns.
async fn intake_loop(
    router: EventRouter,
    mut events: mpsc::Receiver<StreamEvent>,
    cancel: CancellationToken,
) {
    let mut dispatches: JoinSet<()> = JoinSet::new();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            Some(finished) = dispatches.join_next(), if !dispatches.is_empty() => {
                log_dispatch_end(finished);
            }
            event = events.recv() => match event {
                Some(event) => {
                    let router = router.clone();
                    dispatches.spawn(async move { router.handle_event(event).await });
                }
                None => {
                    debug!("event stream closed");
                    break;
                }
            },
        }
    }

    if !dispatches.is_empty() {
        debug!(in_flight = dispatches.len(), "waiting for dispatches to finish");
    }
    while let Some(finished) = dispatches.join_next().await {
        log_dispatch_end(finished);
    }
    debug!("intake loop stopped");
}

fn log_dispatch_end(finished: Result<(), JoinError>) {
    if let Err(e) = finished {
        warn!(error = %e, "event dispatch panicked");
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("router", &self.router)
            .field("tasks", &self.tasks.len())
            .finish()
    }
}
