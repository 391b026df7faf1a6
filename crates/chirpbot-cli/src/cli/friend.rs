//! Affinity lookup command.

use anyhow::Result;
use console::style;

use chirpbot_core::repository::FriendRepository;

use crate::state::AppState;

/// Show the affinity record for `user_id` without creating one.
pub async fn show_friend(state: &AppState, user_id: &str, json: bool) -> Result<()> {
    let record = state.store.find_friend(user_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    println!();
    match record {
        Some(record) => {
            let name = record
                .user
                .as_ref()
                .map(|u| u.acct())
                .unwrap_or_else(|| record.user_id.clone());
            println!("  {} {}", style("Friend").bold(), style(name).cyan());
            println!("  Affinity:   {}", style(format!("{:.2}", record.affinity)).bold());
            println!("  First seen: {}", record.created_at.to_rfc3339());
            println!("  Updated:    {}", record.updated_at.to_rfc3339());
        }
        None => {
            println!(
                "  {} No affinity recorded for '{}'.",
                style("i").blue().bold(),
                style(user_id).cyan(),
            );
        }
    }
    println!();

    Ok(())
}
