//! Card command - look up one entry of the reference dataset

use anyhow::{anyhow, Result};
use clap::Args;
use std::path::PathBuf;

use crate::catalog::CardCatalog;
use crate::cli::output::format_output;
use crate::config::TrackerConfig;

#[derive(Args)]
pub struct CardArgs {
    /// Card identifier, e.g. CS2_182
    pub card_id: String,

    /// Reference card dataset (JSON)
    #[arg(long)]
    pub cards: Option<PathBuf>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

pub fn handle_card(args: CardArgs, config: &TrackerConfig) -> Result<()> {
    let cards_path = args.cards.unwrap_or_else(|| config.cards_path.clone());
    let catalog = CardCatalog::load(&cards_path)?;

    let card = catalog
        .get(&args.card_id)
        .ok_or_else(|| anyhow!("card {} not found in {}", args.card_id, cards_path.display()))?;

    println!("{}", format_output(card, args.json));
    Ok(())
}
