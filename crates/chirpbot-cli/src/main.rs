//! chirpbot entry point.
//!
//! Binary name: `chirpbot`
//!
//! Parses CLI arguments, sets up tracing, opens the data directory and
//! dispatches to the command handler. The agent runs on a current-thread
//! runtime: hooks, the sweeper and the heartbeat share one scheduler.

mod cli;
mod modules;
mod state;

use clap::Parser;

use chirpbot_observe::tracing_setup::{filter_for_verbosity, init_tracing, shutdown_tracing};
use cli::{Cli, Commands};
use state::AppState;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(filter_for_verbosity(cli.verbose, cli.quiet), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let state = AppState::init(cli.data_dir.clone()).await?;

    let result = match cli.command {
        Commands::Run { host, token } => cli::run::run(state, host, token).await,
        Commands::Status => cli::status::status(&state, cli.json).await,
        Commands::Contexts => cli::list::list_contexts(&state, cli.json).await,
        Commands::Timers => cli::list::list_timers(&state, cli.json).await,
        Commands::Friend { user_id } => cli::friend::show_friend(&state, &user_id, cli.json).await,
    };

    shutdown_tracing();
    result
}
