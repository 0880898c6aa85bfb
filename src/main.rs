//! # quote-keeper CLI (`quotes`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `quotes fetch` | Fetch new quotes and append the ones not already stored |
//! | `quotes dedup` | Remove duplicate quotes from the collection |
//! | `quotes sources` | Show the provider chain and file status |
//!
//! ## Environment
//!
//! `MAX_QUOTES_PER_RUN`, `OFFLINE_MODE`, and `DRY_RUN` are read from the
//! environment or from a `.env` file in the working directory. CLI flags
//! take precedence. `RUST_LOG` controls diagnostic output on stderr.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use quote_keeper::config::{self, CliOverrides, RunOptions};
use quote_keeper::{dedup, ingest, sources};

const DEFAULT_CONFIG: &str = "./config/quotes.toml";

/// Maintain a deduplicated JSON collection of quotes.
#[derive(Parser)]
#[command(name = "quotes", version, about)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Optional at the default location; built-in defaults are used when
    /// it does not exist.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch quotes and append those not already in the collection.
    Fetch {
        /// Number of quotes to request (overrides MAX_QUOTES_PER_RUN).
        #[arg(long)]
        count: Option<usize>,

        /// Use bundled seeds only; never touch the network.
        #[arg(long)]
        offline: bool,

        /// Do everything except writing files.
        #[arg(long)]
        dry_run: bool,
    },

    /// Remove duplicate quotes, keeping the first occurrence.
    Dedup {
        /// Report duplicates without rewriting the collection.
        #[arg(long)]
        dry_run: bool,
    },

    /// List quote providers and their status.
    Sources {
        /// Show the offline chain.
        #[arg(long)]
        offline: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Already-set variables win over `.env`.
    let dotenv = dotenv::dotenv();
    init_tracing();
    if let Err(e) = dotenv {
        if !e.not_found() {
            warn!(error = %e, "ignoring unreadable .env");
        }
    }

    let cli = Cli::parse();
    let required = cli.config != PathBuf::from(DEFAULT_CONFIG);
    let cfg = config::load_config(&cli.config, required)?;

    match cli.command {
        Commands::Fetch {
            count,
            offline,
            dry_run,
        } => {
            let opts = RunOptions::resolve(
                &cfg,
                CliOverrides {
                    count,
                    offline,
                    dry_run,
                },
            );
            ingest::run_fetch(&cfg, &opts).await?;
        }
        Commands::Dedup { dry_run } => {
            let opts = RunOptions::resolve(
                &cfg,
                CliOverrides {
                    dry_run,
                    ..Default::default()
                },
            );
            dedup::run_dedup(&cfg, opts.dry_run)?;
        }
        Commands::Sources { offline } => {
            let opts = RunOptions::resolve(
                &cfg,
                CliOverrides {
                    offline,
                    ..Default::default()
                },
            );
            sources::list_sources(&cfg, &opts)?;
        }
    }

    Ok(())
}
