//! Glossa CLI - Command-line interface for message file tools

pub mod commands;
pub mod progress;

use crate::config::Settings;
use clap::Parser;
use commands::Commands;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "glossa", version)]
#[command(about = "Glossa: MSBT, BMG and SARC message file tools", long_about = None)]
struct Cli {
    /// Settings file (defaults to <config dir>/glossa/settings.toml)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Run the Glossa CLI
pub fn run_cli() -> anyhow::Result<()> {
    // Setup logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let settings = match &cli.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::load_or_default(),
    };
    cli.command.execute(&settings)?;

    Ok(())
}
