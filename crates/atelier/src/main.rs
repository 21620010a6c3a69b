// SPDX-FileCopyrightText: 2026 Atelier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Atelier - customer-support desk for the Fashion Store storefront.
//!
//! Binary entry point: loads configuration, initializes tracing, and
//! dispatches subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod serve;

/// Atelier - customer-support desk for the Fashion Store storefront.
#[derive(Parser, Debug)]
#[command(name = "atelier", version, about, long_about = None)]
struct Cli {
    /// Path to a config file. Defaults to the XDG hierarchy plus
    /// `ATELIER_*` environment overrides.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the support desk gateway.
    Serve,
    /// Insert demo accounts for local development.
    Seed,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => atelier_config::load_config_from_path(path),
        None => atelier_config::load_config(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("atelier: {e}");
            std::process::exit(1);
        }
    };

    init_tracing(&config.service.log_level);

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Seed) => serve::run_seed(config).await,
        None => {
            println!("atelier: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "fatal error");
        eprintln!("atelier: {e}");
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("atelier={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
