//! Geodash CLI - dashboard backend for a cached raster preview, CSV data, and data chat.
//!
//! Geodash fetches one remote raster and one remote CSV at startup, keeps them
//! in memory, and serves a bounded-size PNG preview, raster statistics, the
//! cleaned CSV rows, and a chat endpoint grounded in both.
//!
//! # Usage
//!
//! ```bash
//! # Run the HTTP backend
//! geodash serve --port 8000
//!
//! # Render a preview of a local or remote raster
//! geodash preview ./scene.tif --output scene.png
//!
//! # Print raster statistics
//! geodash stats ./scene.tif
//!
//! # View configuration
//! geodash config show
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;
mod server;

/// Geodash - raster preview, CSV data, and data chat backend.
#[derive(Parser, Debug)]
#[command(name = "geodash")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the platform default
    #[arg(long, global = true, env = "GEODASH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP backend
    Serve(cli::serve::ServeArgs),

    /// Render a raster to a bounded-size grayscale PNG
    Preview(cli::preview::PreviewArgs),

    /// Print raster (or CSV) summary statistics
    Stats(cli::stats::StatsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let loaded = match &cli.config {
        Some(path) => geodash_core::Config::load_from(path),
        None => geodash_core::Config::load(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `geodash config path`."
            );
            geodash_core::Config::default()
        }
    };
    logging::init(&config.logging, cli.verbose, cli.json_logs);

    tracing::debug!("Geodash v{}", geodash_core::VERSION);

    match cli.command {
        Commands::Serve(args) => cli::serve::execute(args, config).await,
        Commands::Preview(args) => cli::preview::execute(args, config).await,
        Commands::Stats(args) => cli::stats::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, cli.config).await,
    }
}
