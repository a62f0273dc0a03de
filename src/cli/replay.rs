//! Replay command - run a saved zone log through the session engine once

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::catalog::CardCatalog;
use crate::cli::output::{format_history, format_offerings};
use crate::cli::watch::resolve_paths;
use crate::config::TrackerConfig;
use crate::offering::OfferingSnapshot;
use crate::session::DraftSession;
use crate::tailer::{FollowRead, LogFollower};

#[derive(Args)]
pub struct ReplayArgs {
    /// Reference card dataset (JSON)
    #[arg(long)]
    pub cards: Option<PathBuf>,

    /// Zone log file to replay from the beginning
    #[arg(long, short)]
    pub log: Option<PathBuf>,

    /// Print the final state as JSON
    #[arg(long)]
    pub json: bool,
}

/// Final derived state after a replay
#[derive(Debug, Serialize)]
pub struct ReplayOutput {
    pub lines: u64,
    pub offerings: OfferingSnapshot,
    pub tag_history: Vec<String>,
}

/// Feed every complete line of `log_path` through a fresh session
pub fn replay_file(log_path: &Path, catalog: Arc<CardCatalog>) -> Result<ReplayOutput> {
    let mut follower = LogFollower::open_at_start(log_path)?;
    let mut session = DraftSession::new(catalog);

    while let FollowRead::Line(line) = follower.next_line()? {
        session.process_line(&line);
    }

    Ok(ReplayOutput {
        lines: session.lines_processed(),
        offerings: session.offerings(),
        tag_history: session.tag_history(),
    })
}

pub fn handle_replay(args: ReplayArgs, config: &TrackerConfig) -> Result<()> {
    let (cards_path, log_path) = resolve_paths(args.cards, args.log, config)?;
    let catalog = Arc::new(CardCatalog::load(&cards_path)?);

    let output = replay_file(&log_path, catalog)?;
    info!(path = %log_path.display(), lines = output.lines, "Replay finished");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Replayed {} lines\n", output.lines);
        println!("== Offerings ==\n{}\n", format_offerings(&output.offerings));
        println!("== Tag changes ==\n{}", format_history(&output.tag_history));
    }
    Ok(())
}
