// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! DevMate - a WhatsApp file assistant with a live dashboard event hub.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::{Parser, Subcommand};

mod serve;

/// DevMate - a WhatsApp file assistant with a live dashboard event hub.
#[derive(Parser, Debug)]
#[command(name = "devmate", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the DevMate server (webhook, ingestion, dashboard).
    Serve,
    /// Load and validate the configuration, then exit.
    CheckConfig,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match devmate_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            devmate_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("devmate serve failed: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::CheckConfig) => {
            println!(
                "config OK (agent.name={}, server={}:{}, storage={})",
                config.agent.name,
                config.server.host,
                config.server.port,
                if config.storage.in_memory {
                    "in-memory".to_string()
                } else {
                    config.storage.database_path.clone()
                }
            );
        }
        None => {
            println!("devmate: use --help for available commands");
        }
    }
}
