//! cfl CLI - Confluence publishing for test reports.
//!
//! Provides commands for:
//! - `create page`: Publish a dated report page under a monthly parent
//! - `update page`: Replace a page body and enable the report macros
//! - `upload attachment`: Attach a file to an existing page

mod commands;
mod error;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CreateCommand, UpdateCommand, UploadCommand};
use output::Output;

/// cfl - Confluence publishing for test reports.
#[derive(Parser)]
#[command(name = "cfl", version, about)]
struct Cli {
    /// Path to configuration file (default: auto-discover cfl.toml).
    #[arg(short, long, global = true, env = "CFL_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create Confluence resources.
    #[command(subcommand)]
    Create(CreateCommand),
    /// Update Confluence resources.
    #[command(subcommand)]
    Update(UpdateCommand),
    /// Upload files to Confluence.
    #[command(subcommand)]
    Upload(UploadCommand),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = commands::connect(cli.config.as_deref(), &output).and_then(|client| {
        match cli.command {
            Commands::Create(cmd) => cmd.execute(&client, &output),
            Commands::Update(cmd) => cmd.execute(&client, &output),
            Commands::Upload(cmd) => cmd.execute(&client, &output),
        }
    });

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
