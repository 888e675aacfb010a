// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Concierge - a persona-routing LLM gateway.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod inspect;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Concierge - routes queries to the right persona and model.
#[derive(Parser, Debug)]
#[command(name = "concierge", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway.
    Serve,
    /// Show the persona and model a query would be routed to, without calling anything.
    Classify {
        /// The query text.
        text: String,
    },
    /// Route a query to its provider and print the answer.
    Route {
        /// The query text.
        text: String,
    },
    /// Print the effective configuration with API keys masked.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => concierge_config::load_and_validate_path(path),
        None => concierge_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            concierge_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Classify { text }) => inspect::run_classify(&config, &text),
        Some(Commands::Route { text }) => inspect::run_route(&config, &text).await,
        Some(Commands::Config) => inspect::run_config_show(&config),
        None => {
            println!("concierge: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
