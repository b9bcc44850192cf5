// SPDX-FileCopyrightText: 2026 Coffee Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Coffee - a simulated coffee machine service.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod seed;
mod serve;
mod shutdown;
mod stats;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use coffee_config::CoffeeConfig;

/// Coffee - a simulated coffee machine service.
#[derive(Parser, Debug)]
#[command(name = "coffee", version, about, long_about = None)]
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
    /// Start the HTTP service.
    Serve,
    /// Append synthetic brew events to the audit log.
    Seed {
        /// Number of events to write.
        #[arg(long, default_value_t = coffee_audit::seed::DEFAULT_COUNT)]
        count: u32,
        /// How many days back the first event is placed.
        #[arg(long, default_value_t = coffee_audit::seed::DEFAULT_DAYS_BACK)]
        days: u32,
    },
    /// Print brewing statistics as JSON.
    Stats,
    /// Print the effective configuration as TOML.
    Config,
}

fn load_config(path: Option<&std::path::Path>) -> Result<CoffeeConfig, ExitCode> {
    let loaded = match path {
        Some(path) => coffee_config::load_and_validate_path(path),
        None => coffee_config::load_and_validate(),
    };
    loaded.map_err(|errors| {
        coffee_config::render_errors(&errors);
        ExitCode::FAILURE
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Seed { count, days }) => {
            serve::init_tracing(&config.service.log_level);
            seed::run_seed(config.storage, count, days)
                .await
                .map(|written| println!("seeded {written} brew events"))
        }
        Some(Commands::Stats) => stats::render_stats(config.storage)
            .await
            .map(|json| println!("{json}")),
        Some(Commands::Config) => match toml::to_string_pretty(&config) {
            Ok(text) => {
                print!("{text}");
                Ok(())
            }
            Err(e) => Err(coffee_core::CoffeeError::Internal(format!(
                "failed to render configuration: {e}"
            ))),
        },
        None => {
            println!("coffee: use --help for available commands");
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("coffee: {e}");
            ExitCode::FAILURE
        }
    }
}
