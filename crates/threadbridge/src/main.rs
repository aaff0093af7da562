// SPDX-FileCopyrightText: 2026 threadbridge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! threadbridge - relays Discord channel messages to an OpenAI assistant.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod check;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use threadbridge_config::{ConfigError, ThreadbridgeConfig};

/// threadbridge - relays Discord channel messages to an OpenAI assistant.
#[derive(Parser, Debug)]
#[command(name = "threadbridge", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Commands {
    /// Connect to Discord and relay messages (the default).
    Serve,
    /// Load and validate configuration, then print a redacted summary.
    CheckConfig,
}

fn load_config(path: Option<&std::path::Path>) -> Result<ThreadbridgeConfig, Vec<ConfigError>> {
    match path {
        Some(path) => threadbridge_config::load_and_validate_path(path),
        None => threadbridge_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup
    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            threadbridge_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Commands::CheckConfig => {
            print!("{}", check::summary(&config));
        }
    }
}
