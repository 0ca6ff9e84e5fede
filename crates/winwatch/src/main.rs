//! winwatch: run the watch engine from the command line.
//!
//! Loads triggers, starts the window and process watch loops, prints
//! notifications to stderr, and stops cleanly on Ctrl-C.

use std::{path::PathBuf, process::ExitCode, sync::Arc, time::Duration};

use clap::Parser;
use tokio::sync::mpsc;
use tracing::{info, warn};
use winwatch_engine::{Engine, NotificationDispatcher};
use winwatch_protocol::{Notice, NotifyKind};
use winwatch_world::{SysProbe, WatchCfg};

/// Command line arguments.
#[derive(Debug, Parser)]
#[command(name = "winwatch", about = "Run scripts when windows and processes change state")]
struct Cli {
    /// Trigger file (defaults to ~/.winwatch/triggers.ron)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Poll interval in milliseconds
    #[arg(long, default_value_t = winwatch_world::DEFAULT_POLL_MS)]
    interval_ms: u64,

    #[command(flatten)]
    logs: logging::LogArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(logging::env_filter_from_spec(&cli.logs.spec()))
        .init();

    let path = cli.config.unwrap_or_else(config::default_config_path);
    let triggers = if path.exists() {
        match config::load_from_path(&path) {
            Ok(triggers) => triggers,
            Err(e) => {
                eprintln!("{}", e.pretty());
                return ExitCode::FAILURE;
            }
        }
    } else {
        warn!(path = %path.display(), "no trigger file, starting with an empty set");
        Vec::new()
    };
    info!(count = triggers.len(), "triggers loaded");

    let (tx, mut rx) = mpsc::channel::<Notice>(64);
    tokio::spawn(async move {
        while let Some(notice) = rx.recv().await {
            let tag = match notice.kind {
                NotifyKind::Info => "info",
                NotifyKind::Warn => "warn",
                NotifyKind::Error => "error",
            };
            eprintln!("[{}] {}: {}", tag, notice.title, notice.text);
        }
    });

    let engine = Engine::new(
        Arc::new(SysProbe::new()),
        NotificationDispatcher::new(tx),
        WatchCfg {
            interval: Duration::from_millis(cli.interval_ms),
        },
    );
    engine.reset_associations(triggers);
    engine.begin_watch();
    info!("watching; press Ctrl-C to stop");

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
    }
    engine.end_watch().await;
    ExitCode::SUCCESS
}
