//! Overton Kiosk - the installation runtime
//!
//! Wires the physical input device (sliders or switches over HTTP) to the
//! playback sequencer and drives a video surface with its decisions.

use clap::Parser;
use overton_core::InstallationConfig;
use std::path::PathBuf;
use tracing::warn;

mod app;
mod input;
mod surface;

/// Two-axis interactive video installation runtime
#[derive(Parser)]
#[command(name = "overton-kiosk")]
#[command(version)]
#[command(about = "Two-axis interactive video installation runtime", long_about = None)]
struct Cli {
    /// Path to the installation config file
    #[arg(short, long, default_value = "overton.json")]
    config: PathBuf,

    /// Override the device host from the config
    #[arg(long)]
    device_host: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(level)
        .init();

    let mut config = if cli.config.exists() {
        InstallationConfig::load(&cli.config)?
    } else {
        warn!(
            path = %cli.config.display(),
            "config file not found, using built-in defaults"
        );
        InstallationConfig::default()
    };

    if let Some(host) = cli.device_host {
        config.device.host = host;
    }

    app::run(config).await
}
