//! Watch command - follow a live zone log and print every snapshot

use anyhow::{anyhow, Result};
use clap::Args;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::catalog::CardCatalog;
use crate::cli::output::format_event;
use crate::config::TrackerConfig;
use crate::tailer::{Tailer, TailerEvent, TailerEvents, TailerOptions};

#[derive(Args)]
pub struct WatchArgs {
    /// Reference card dataset (JSON)
    #[arg(long)]
    pub cards: Option<PathBuf>,

    /// Zone log file to follow
    #[arg(long, short)]
    pub log: Option<PathBuf>,

    /// Poll interval in milliseconds when no new data is available
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Print events as JSON lines
    #[arg(long)]
    pub json: bool,
}

pub(crate) fn resolve_paths(
    cards: Option<PathBuf>,
    log: Option<PathBuf>,
    config: &TrackerConfig,
) -> Result<(PathBuf, PathBuf)> {
    let cards = cards.unwrap_or_else(|| config.cards_path.clone());
    let log = log.or_else(|| config.log_path.clone()).ok_or_else(|| {
        anyhow!(
            "no log file given: pass --log or set log_path in {}",
            TrackerConfig::default_path().display()
        )
    })?;
    Ok((cards, log))
}

pub async fn handle_watch(args: WatchArgs, config: &TrackerConfig) -> Result<()> {
    let (cards_path, log_path) = resolve_paths(args.cards, args.log, config)?;

    // Catalog problems are fatal before anything is followed
    let catalog = Arc::new(CardCatalog::load(&cards_path)?);

    let mut options = TailerOptions::from(config);
    if let Some(ms) = args.interval_ms {
        options.poll_interval = Duration::from_millis(ms);
    }

    let mut tailer = Tailer::with_options(catalog, options);
    let events = tailer.attach(&log_path)?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    follow(&mut tailer, events, shutdown, args.json).await
}

/// Print events until the worker stops or fails. `shutdown` is polled
/// until it first completes, then the worker is asked to stop.
async fn follow<F>(tailer: &mut Tailer, mut events: TailerEvents, shutdown: F, json: bool) -> Result<()>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut interrupted = false;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                print_event(&event, json);

                match event {
                    TailerEvent::Failed { error } => {
                        tailer.stop();
                        return Err(anyhow!(error));
                    }
                    TailerEvent::Stopped => break,
                    _ => {}
                }
            }
            _ = &mut shutdown, if !interrupted => {
                interrupted = true;
                info!("Interrupted, stopping tailer");
                tailer.request_stop();
            }
        }
    }

    tailer.stop();
    Ok(())
}

fn print_event(event: &TailerEvent, json: bool) {
    if json {
        println!("{}", format_event(event, true));
    } else {
        println!(
            "[{}] {}",
            chrono::Local::now().format("%H:%M:%S"),
            format_event(event, false)
        );
    }
}
