//! `kidsafe`: command-line front end for the geofencing and alerting engine.
//!
//! Reads `kidsafe.toml` (or the path given with `--config`), opens the SQLite
//! store, restores the engine from its last snapshot, runs one command and
//! saves the snapshot again if the command changed anything.
//!
//! # Usage
//!
//! ```
//! kidsafe register --name Dana --email dana@example.com --role parent
//! kidsafe register --name Maya --email maya@example.com --role child
//! kidsafe pair --child maya@example.com --code 482913
//! kidsafe zone add --name Home --lat 40.7128 --lng -74.0060 --radius 100
//! kidsafe simulate --child maya@example.com --seconds 30 --band
//! kidsafe alerts --unacknowledged
//! ```

mod commands;
mod settings;

use std::path::PathBuf;

use clap::Parser;
use commands::Command;
use settings::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kidsafe", author, version, about = "Child safety geofencing and alerts")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "kidsafe.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;

  commands::run(&settings, cli.command).await
}
