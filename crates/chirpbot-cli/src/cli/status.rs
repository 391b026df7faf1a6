//! Memory status dashboard command.

use anyhow::Result;
use chrono::{DateTime, Utc};
use console::style;

use chirpbot_core::repository::{ContextRepository, FriendRepository, MetaRepository, TimerRepository};

use crate::state::AppState;

/// Display counts of stored contexts, timers and friends plus the last
/// heartbeat.
pub async fn status(state: &AppState, json: bool) -> Result<()> {
    let contexts = state.store.list_contexts().await?;
    let timers = state.store.list_timers().await?;
    let friends = state.store.list_friends().await?;
    let meta = state.store.load_meta().await?;
    let last_waking_at = meta.as_ref().map(|m| m.last_waking_at);

    if json {
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "host": state.config.host,
            "contexts": contexts.len(),
            "timers": timers.len(),
            "friends": friends.len(),
            "last_waking_at": last_waking_at,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!("  {} chirpbot v{}", style("🐦").bold(), env!("CARGO_PKG_VERSION"));
    println!();

    println!("  {}", style("── Memory ──").dim());
    println!("  Contexts: {}", style(contexts.len()).bold());
    println!("  Timers:   {}", style(timers.len()).bold());
    println!("  Friends:  {}", style(friends.len()).bold());
    println!();

    println!("  {}", style("── Liveness ──").dim());
    match last_waking_at.and_then(DateTime::<Utc>::from_timestamp_millis) {
        Some(at) => println!("  Last heartbeat: {}", style(at.to_rfc3339()).cyan()),
        None => println!("  Last heartbeat: {}", style("never").dim()),
    }
    println!();

    println!("  {}", style("── System ──").dim());
    println!(
        "  Host:     {}",
        style(state.config.host.as_deref().unwrap_or("(not configured)")).dim()
    );
    println!("  Data dir: {}", style(state.data_dir.display()).dim());
    println!("  Database: {}", style("SQLite (WAL mode)").dim());
    println!();

    Ok(())
}
