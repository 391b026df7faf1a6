//! CLI command definitions for the `chirpbot` binary.

pub mod friend;
pub mod list;
pub mod run;
pub mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// A conversational agent for your social network account.
#[derive(Debug, Parser)]
#[command(name = "chirpbot", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    /// Directory holding config.toml and the database.
    #[arg(long, global = true, env = "CHIRPBOT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Connect to the instance and start the agent.
    Run {
        /// Instance origin, e.g. https://example.social.
        #[arg(long, env = "CHIRPBOT_HOST")]
        host: Option<String>,

        /// Access token for the agent's account.
        #[arg(long, env = "CHIRPBOT_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },

    /// Summarize the agent's stored memory.
    Status,

    /// List open conversation contexts.
    Contexts,

    /// List pending timers.
    Timers,

    /// Show the affinity record for a user.
    Friend {
        /// Remote user id.
        user_id: String,
    },
}
