//! declsynth CLI - declaration-driven source synthesis
//!
//! Reads a declaration graph (JSON), runs the discriminator,
//! persistence-contract and controller-contract synthesizers round by round
//! and writes the generated Kotlin sources:
//! - `generate` writes units and a manifest below an output directory
//! - `check` performs the same run in memory and reports what it would write
//! - `markers` prints the marker vocabulary in effect

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;
mod output;

use config::CliConfig;
use error::CliResult;

/// declsynth CLI application
#[derive(Parser)]
#[command(name = "declsynth")]
#[command(about = "declsynth - synthesize Kotlin sources from annotated declarations", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "DECLSYNTH_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Synthesize sources and write them below an output directory
    Generate {
        /// Declaration graph (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory (defaults to [output] directory from the config)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Dry run: report what would be generated without writing anything
    Check {
        /// Declaration graph (JSON)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Show the recognised markers
    Markers,
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = run(cli) {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let config = CliConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate { input, out } => {
            commands::generate::execute(&input, out, &config, cli.format)
        }
        Commands::Check { input } => commands::check::execute(&input, &config, cli.format),
        Commands::Markers => commands::markers::execute(&config, cli.format),
    }
}
