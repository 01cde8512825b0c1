//! Photolog CLI - a photo journal server with EXIF-aware ingestion.
//!
//! Photolog stores uploaded photos, derives upright thumbnails and previews,
//! and keeps a JSON catalog of capture metadata.
//!
//! # Usage
//!
//! ```bash
//! # Serve the upload/lookup API
//! photolog serve --bind 0.0.0.0:5080
//!
//! # Import a directory from the command line
//! photolog import ./camera-roll/
//!
//! # Browse and prune the catalog
//! photolog list
//! photolog show <id>
//! photolog delete <id>
//!
//! # View configuration
//! photolog config show
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;
mod server;

/// Photolog - photo journal with EXIF-aware ingestion.
#[derive(Parser, Debug)]
#[command(name = "photolog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "PHOTOLOG_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve(cli::serve::ServeArgs),

    /// Import image files or directories into the journal
    Import(cli::import::ImportArgs),

    /// List cataloged photos, newest first
    List(cli::catalog::ListArgs),

    /// Show the full record of one photo
    Show(cli::catalog::ShowArgs),

    /// Delete a photo and its images
    Delete(cli::catalog::DeleteArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let loaded = match &cli.config {
        Some(path) => photolog_core::Config::load_from(path),
        None => photolog_core::Config::load(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `photolog config path`."
            );
            photolog_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Photolog v{}", photolog_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Serve(args) => cli::serve::execute(args, config).await,
        Commands::Import(args) => cli::import::execute(args, config).await,
        Commands::List(args) => cli::catalog::list(args, config),
        Commands::Show(args) => cli::catalog::show(args, config),
        Commands::Delete(args) => cli::catalog::delete(args, config),
        Commands::Config(args) => cli::config::execute(args, cli.config, config),
    }
}
