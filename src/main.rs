// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Filamentdb CLI - filament catalog builder and vendor reconciler

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use filamentdb::commands;
use filamentdb::commands::reconcile::ReconcileArgs;
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "filamentdb")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file path
    #[arg(short, long, env = "FILAMENTDB_CONFIG", global = true)]
    config: Option<std::path::PathBuf>,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", global = true)]
    no_color: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the catalog source and write the expanded index
    Build {
        /// Catalog source directory
        #[arg(short, long)]
        source: Option<std::path::PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },

    /// Report scraped variants that are not in the catalog yet
    Reconcile {
        /// Directory of scraped candidate files (<product-id>.yaml)
        #[arg(long)]
        candidates: Option<std::path::PathBuf>,

        /// Build output to reconcile against
        #[arg(long)]
        bundle: Option<std::path::PathBuf>,

        /// Only products of this vendor
        #[arg(long)]
        vendor: Option<String>,

        /// Only this product
        #[arg(long)]
        product: Option<String>,
    },

    /// Print the effective configuration
    Config {
        /// Configuration key (prints everything if omitted)
        key: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: clap_complete::Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = filamentdb::config::load(cli.config.as_deref())?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 if cli.quiet => "error",
        0 => config.log_level.as_str(),
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Build { source, output } => commands::build::run(&config, source, output),
        Commands::Reconcile { candidates, bundle, vendor, product } => {
            let args = ReconcileArgs { bundle, candidates, vendor, product };
            let color = !cli.no_color && std::io::stdout().is_terminal();
            commands::reconcile::run(&config, args, cli.json, color)
        }
        Commands::Config { key } => commands::config::run(&config, key.as_deref()),
        Commands::Completions { shell } => commands::completions::run(shell, &mut Cli::command()),
    }
}
