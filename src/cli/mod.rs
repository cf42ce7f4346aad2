//! Command-line interface for prefstack
//!
//! Provides `merge`, `check` and `explain` subcommands over a stack of
//! preference overlays.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod check;
mod explain;
mod merge;
mod utils;

/// Parse and merge layered pref()/user_pref() preference overlays
#[derive(Parser)]
#[command(name = "prefstack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge overlays into one preference set
    Merge(merge::MergeArgs),

    /// Parse overlays and report every malformed declaration
    Check(check::CheckArgs),

    /// Show every declaration of a preference and which one wins
    Explain(explain::ExplainArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let default_level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_str().to_ascii_lowercase()));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    match cli.command {
        Commands::Merge(args) => merge::run(args),
        Commands::Check(args) => check::run(args),
        Commands::Explain(args) => explain::run(args),
    }
}
