//! Nomen CLI
//!
//! Command-line interface for the ICD-10 nomenclature importer

mod commands;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use nomen_core::{Result, init_tracing};
use std::path::PathBuf;
use tracing::error;

#[derive(Parser)]
#[command(name = "nomen")]
#[command(about = "Import hierarchical ICD-10 nomenclature documents into a relational store")]
#[command(version = nomen_core::VERSION)]
#[command(
    long_about = "Nomen walks an ICD-10 tabular document (chapters, sections and nested\n\
diagnostic entries) and writes it, with its annotations, to a SQLite database.\n\
\n\
Examples:\n  \
nomen import tabular.xml -d nomen.db     # Import after confirmation\n  \
nomen import tabular.xml -d nomen.db -y  # Import without prompting\n  \
nomen inspect tabular.xml --format json  # Dry run, print statistics"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        help = "Path to configuration file (.nomenrc.toml/nomen.toml/nomen.json)"
    )]
    config: Option<PathBuf>,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a nomenclature document into a SQLite database
    Import {
        /// Nomenclature document (overrides `document` from config)
        document: Option<PathBuf>,

        /// Target database (overrides `database` from config)
        #[arg(short, long, env = "NOMEN_DATABASE")]
        database: Option<PathBuf>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Import into memory only and report what would be written
    Inspect {
        /// Nomenclature document (overrides `document` from config)
        document: Option<PathBuf>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Show version information
    Version,
}

/// Options shared by `import` and `inspect`
#[derive(clap::Args, Debug, Clone)]
pub struct RunArgs {
    /// Output format for the summary
    #[arg(short, long, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Version tag stamped on chapters and codes
    #[arg(long = "nomenclature-version")]
    pub nomenclature_version: Option<String>,

    /// Report progress every N codes
    #[arg(long)]
    pub progress_interval: Option<usize>,

    /// Do not log each section as it is imported
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output with colors
    Human,
    /// JSON output for machine processing
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize colored output
    if !cli.no_color && std::env::var("NO_COLOR").is_err() {
        colored::control::set_override(true);
    } else {
        colored::control::set_override(false);
    }

    let log_level = match cli.verbose {
        0 => "nomen=warn",
        1 => "nomen=info",
        2 => "nomen=debug",
        _ => "nomen=trace",
    };
    init_tracing(log_level);

    match run_command(cli) {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Nomenclature import failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_command(cli: Cli) -> Result<()> {
    let config = cli.config.as_deref();
    match cli.command {
        Commands::Import {
            document,
            database,
            yes,
            run,
        } => commands::import_command(config, document, database, yes, run),
        Commands::Inspect { document, run } => commands::inspect_command(config, document, run),
        Commands::Version => {
            commands::version_command();
            Ok(())
        }
    }
}
