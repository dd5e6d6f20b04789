// Copyright 2026 Aqarscan Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use aqarscan::cli;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "aqarscan",
    about = "aqarscan, an incremental crawler for rendered listing sites",
    version,
    after_help = "Run 'aqarscan <command> --help' for details on each command."
)]
struct Cli {
    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl listing sections and export the records
    Crawl {
        /// Section to crawl (sale, rent, exchange, offices); omit for all
        #[arg(long)]
        section: Option<String>,
        /// Directory for the per-day export folders
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Check environment and diagnose issues
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        "aqarscan=debug"
    } else if cli.quiet {
        "aqarscan=warn"
    } else {
        "aqarscan=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_level.parse().unwrap()),
        )
        .init();

    let result = match cli.command {
        Commands::Crawl { section, out } => cli::crawl_cmd::run(section.as_deref(), &out).await,
        Commands::Doctor => cli::doctor::run().await,
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        eprintln!("  Error: {e:#}");
        std::process::exit(1);
    }

    result
}
