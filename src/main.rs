//! ToT Solver CLI
//!
//! Follows a game client's zone log and prints the current draft offering.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};
use tot_solver::cli::{handle_card, handle_replay, handle_watch, CardArgs, ReplayArgs, WatchArgs};
use tot_solver::TrackerConfig;

#[derive(Parser)]
#[command(name = "tot-solver")]
#[command(about = "ToT Solver - track the live draft offering from the zone log")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/tot-solver/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Follow a live zone log and print offerings and tag changes as they change
    Watch(WatchArgs),
    /// Process a saved zone log from the start and print the final state
    Replay(ReplayArgs),
    /// Show the reference entry for a card
    Card(CardArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity, e.g. RUST_LOG=tot_solver=debug
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tot_solver=info"));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => TrackerConfig::load_from(path)?,
        None => TrackerConfig::load()?,
    };

    match cli.command {
        Commands::Watch(args) => handle_watch(args, &config).await?,
        Commands::Replay(args) => handle_replay(args, &config)?,
        Commands::Card(args) => handle_card(args, &config)?,
    }

    Ok(())
}
