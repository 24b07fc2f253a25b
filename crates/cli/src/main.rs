//! Progresso CLI - skill tree progress tracker.

mod commands;
mod config;
mod render;
mod resolve;
mod shell;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use progresso_progress::ProgressEngine;
use progresso_storage::{JsonStorage, Session};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::commands::Op;
use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "progresso")]
#[command(about = "Skill tree progress tracker", long_about = None)]
struct Cli {
    /// Data directory (default: platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read commands from stdin; saves on `quit`, Ctrl-C, or end of input
    Shell,

    #[command(flatten)]
    Op(Op),
}

fn init_logging(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("PROGRESSO_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let data_dir = cli.data_dir.unwrap_or_else(config::default_data_dir);
    let config = AppConfig::load(&data_dir);
    debug!(data_dir = %data_dir.display(), ?config, "Starting");

    let storage = JsonStorage::new(&data_dir)
        .await
        .with_context(|| format!("Failed to open data directory {}", data_dir.display()))?;
    let mut session = Session::open(storage, config.store_key.clone())
        .await
        .context("Failed to load snapshot")?;
    let engine = ProgressEngine::new().with_config(config.engine_config());

    match cli.command {
        Commands::Shell => shell::run(session, engine, config).await,
        Commands::Op(op) => {
            let out = commands::apply(op, &mut session, &engine, &config)?;
            println!("{}", out);
            if session.is_dirty() {
                let ack = session
                    .shutdown()
                    .await
                    .map_err(|(_, err)| anyhow!("Failed to save: {err}"))?;
                info!(key = %ack.key, bytes = ack.bytes, "Saved");
            }
            Ok(())
        }
    }
}
