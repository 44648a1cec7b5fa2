mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ensure")]
#[command(version, about = "Declarative validation engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a parameter document against a constraint document
    Validate {
        /// Path to the constraint document (YAML, TOML or JSON)
        constraints: String,

        /// Path to the parameter document (YAML, TOML or JSON)
        params: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Render field labels in start case ("someVar" → "Some Var")
        #[arg(long)]
        start_case: bool,

        /// Prefix each message with its property path
        #[arg(long)]
        with_paths: bool,

        /// Maximum nesting depth of object/each constraints
        #[arg(long, default_value_t = ensure_core::DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },

    /// Check a constraint document without validating any data
    Check {
        /// Path to the constraint document (YAML, TOML or JSON)
        constraints: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .with(filter)
        .init();

    match cli.command {
        Commands::Validate {
            constraints,
            params,
            format,
            start_case,
            with_paths,
            max_depth,
        } => commands::validate::execute(
            &constraints,
            &params,
            format,
            commands::validate::Options {
                start_case,
                with_paths,
                max_depth,
            },
        ),

        Commands::Check {
            constraints,
            format,
        } => commands::check::execute(&constraints, format),
    }
}
