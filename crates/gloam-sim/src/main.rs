//! # Gloam Sim
//!
//! Headless encounter simulator for the Gloam combat engine.
//!
//! Loads `gloam.toml` (or the path given as the first argument), spawns the
//! configured encounter and prints a JSON report when it is decided.
//! `--init` writes the default configuration instead of running.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod app;
mod config;
mod host;
mod report;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::SimConfig;

/// Headless encounter simulator for the Gloam combat engine
#[derive(Parser)]
#[command(name = "gloam-sim")]
#[command(about = "Runs one encounter and prints a JSON report", long_about = None)]
#[command(version)]
struct Cli {
    /// Scenario configuration file
    #[arg(default_value_os_t = SimConfig::config_path())]
    config: PathBuf,

    /// Write the default configuration to CONFIG and exit
    #[arg(long)]
    init: bool,
}

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::from_default_env()
                .add_directive("gloam_sim=info".parse()?)
                .add_directive("gloam_combat=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    if cli.init {
        SimConfig::default().save_to(&cli.config)?;
        return Ok(());
    }

    info!("Gloam sim starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let report = app::run(&cli.config)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
