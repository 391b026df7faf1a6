//! `chirpbot run`: boot the agent and stream events until Ctrl-C.

use anyhow::Result;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::mpsc;

use chirpbot_core::agent::Runtime;
use chirpbot_core::api::BoxSocialApi;
use chirpbot_core::repository::BoxStore;
use chirpbot_infra::config::apply_overrides;
use chirpbot_infra::remote::{HttpSocialApi, StreamClient};
use chirpbot_types::error::{ConfigError, StartupError};

use crate::modules::builtin_modules;
use crate::state::AppState;

/// Capacity of the stream-to-router channel.
const EVENT_BUFFER: usize = 256;

pub async fn run(state: AppState, host: Option<String>, token: Option<String>) -> Result<()> {
    let AppState { config, store, .. } = state;
    let mut config = apply_overrides(config, host, token.map(SecretString::from));

    let host = config.require_host().map_err(StartupError::from)?;
    let token = config
        .token
        .take()
        .ok_or(StartupError::Config(ConfigError::Missing("token")))?;

    let api = HttpSocialApi::new(host.clone(), SecretString::from(token.expose_secret().to_owned()))?;
    let mut runtime = Runtime::boot(
        BoxStore::new(store.clone()),
        BoxSocialApi::new(api),
        config.settings,
        builtin_modules(),
    )
    .await
    .inspect_err(|e| tracing::error!(error = %e, "startup failed"))?;

    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    let stream = tokio::spawn(StreamClient::new(host, token).run(tx, runtime.cancellation_token()));
    runtime.start(rx);

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!("shutdown requested");
        }
        _ = runtime.cancelled() => {}
    }

    runtime.shutdown().await;
    if let Err(e) = stream.await {
        tracing::warn!(error = %e, "stream task ended abnormally");
    }
    store.close().await;
    Ok(())
}
