//! Listing commands for conversation contexts and pending timers.

use anyhow::Result;
use chrono::{DateTime, Utc};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use chirpbot_core::repository::{ContextRepository, TimerRepository};

use crate::state::AppState;

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).fg(Color::White))
            .collect::<Vec<_>>(),
    );
    table
}

fn format_millis(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ms.to_string())
}

/// List open conversation contexts, oldest first.
pub async fn list_contexts(state: &AppState, json: bool) -> Result<()> {
    let contexts = state.store.list_contexts().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&contexts)?);
        return Ok(());
    }

    if contexts.is_empty() {
        println!();
        println!("  {} No open conversation contexts.", style("i").blue().bold());
        println!();
        return Ok(());
    }

    let mut table = new_table(&["Module", "Key", "Conversation", "Created"]);
    for context in &contexts {
        let target = if context.target.is_dm() {
            format!("dm:{}", context.target.id())
        } else {
            format!("note:{}", context.target.id())
        };
        table.add_row(vec![
            Cell::new(&context.module).fg(Color::Cyan),
            Cell::new(context.key.as_deref().unwrap_or("-")),
            Cell::new(target),
            Cell::new(context.created_at.to_rfc3339()),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}

/// List pending timers in firing-check order.
pub async fn list_timers(state: &AppState, json: bool) -> Result<()> {
    let timers = state.store.list_timers().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&timers)?);
        return Ok(());
    }

    if timers.is_empty() {
        println!();
        println!("  {} No pending timers.", style("i").blue().bold());
        println!();
        return Ok(());
    }

    let now = Utc::now().timestamp_millis();
    let mut table = new_table(&["Module", "Id", "Due", "Status"]);
    for timer in &timers {
        let status = if timer.is_due(now) {
            Cell::new("due").fg(Color::Yellow)
        } else {
            Cell::new(format!("in {}s", (timer.due_at() - now) / 1000)).fg(Color::Green)
        };
        table.add_row(vec![
            Cell::new(&timer.module).fg(Color::Cyan),
            Cell::new(timer.id.to_string()),
            Cell::new(format_millis(timer.due_at())),
            status,
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_millis_is_rfc3339() {
        assert_eq!(format_millis(0), "1970-01-01T00:00:00+00:00");
    }
}
