#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Arcade Manager headlessly and prints the
//! rendered character grid.

use std::{io, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use arcade_manager_cli::{ArcadeConfig, Session};
use arcade_manager_rendering::TextBackend;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Arcade management simulation on a character grid", long_about = None)]
struct Cli {
    /// TOML file describing the screen, simulation, property, and catalog.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Plays this many business days automatically, then exits.
    #[arg(long)]
    days: Option<u32>,
    /// Overrides the simulation seed from the config file.
    #[arg(long)]
    seed: Option<u64>,
    /// Simulated milliseconds per rendered frame.
    #[arg(long, default_value_t = 50)]
    frame_ms: u64,
    /// Prints every frame instead of only the last one.
    #[arg(long)]
    dump_frame: bool,
    /// Frames to render when no days are played automatically.
    #[arg(long, default_value_t = 1)]
    frames: u64,
}

/// Entry point for the Arcade Manager command-line interface.
fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => ArcadeConfig::load(path)?,
        None => ArcadeConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.simulation.seed = seed;
    }
    info!(seed = config.simulation.seed, days = ?cli.days, "starting session");

    let mut session = Session::new(config).context("failed to lay out the game screens")?;
    session.set_autoplay(cli.days);

    let frame_limit = if cli.days.is_some() {
        u64::MAX
    } else {
        cli.frames
    };
    let backend = TextBackend::new(io::stdout().lock(), Duration::from_millis(cli.frame_ms.max(1)))
        .with_frame_limit(frame_limit)
        .with_dump_every_frame(cli.dump_frame);
    session.run(backend)
}
