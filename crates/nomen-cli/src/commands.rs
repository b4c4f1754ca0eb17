//! Command implementations

use std::path::{Path, PathBuf};
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use inquire::Confirm;
use nomen_core::{
    ConfigLoader, ImportConfig, ImportSummary, MemoryStore, NomenError, NomenclatureImporter,
    NomenclatureStore, Result, SqliteStore,
};
use tracing::{debug, info};

use crate::output::print_summary;
use crate::{OutputFormat, RunArgs};

/// Load config and apply command-line overrides
fn resolve_config(
    config_path: Option<&Path>,
    document: Option<PathBuf>,
    database: Option<PathBuf>,
    run: &RunArgs,
) -> Result<ImportConfig> {
    let mut config = ConfigLoader::load(config_path, None)?;

    if document.is_some() {
        config.document = document;
    }
    if database.is_some() {
        config.database = database;
    }
    if let Some(version) = &run.nomenclature_version {
        config.version = version.clone();
    }
    if let Some(interval) = run.progress_interval {
        config.progress_interval = interval;
    }
    if run.quiet {
        config.verbose = false;
    }

    config.validate()?;
    debug!("Effective config: {:?}", config);
    Ok(config)
}

fn require_document(config: &ImportConfig) -> Result<&Path> {
    config.document.as_deref().ok_or_else(|| {
        NomenError::config_error(
            "No nomenclature document given. Pass it as an argument or set `document` in the config file",
        )
    })
}

/// Spinner fed by the importer's progress callback; hidden when stderr is not a terminal
fn progress_spinner(format: OutputFormat) -> ProgressBar {
    if format != OutputFormat::Human {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message("Importing nomenclature...");
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

fn run_import<S: NomenclatureStore + ?Sized>(
    config: &ImportConfig,
    document: &Path,
    store: &mut S,
    format: OutputFormat,
) -> Result<ImportSummary> {
    let spinner = progress_spinner(format);
    let feed = spinner.clone();

    let result = NomenclatureImporter::new(config.import_options())
        .with_progress(move |stats| feed.set_message(format!("{} codes processed", stats.codes)))
        .import_file(document, store);

    spinner.finish_and_clear();
    result
}

fn print_plan(document: &Path, target: &str) {
    println!("{}", "Nomenclature import".bold());
    println!("  Document: {}", document.display().to_string().cyan());
    println!("  Database: {}", target.cyan());
    println!();
    println!(
        "{}",
        "Rows are appended; existing nomenclature rows are not replaced.".yellow()
    );
}

fn confirm(target: &str) -> bool {
    Confirm::new(&format!("Continue importing into {target}?"))
        .with_default(false)
        .prompt()
        .unwrap_or(false)
}

/// Import a document into a SQLite database
pub fn import_command(
    config_path: Option<&Path>,
    document: Option<PathBuf>,
    database: Option<PathBuf>,
    assume_yes: bool,
    run: RunArgs,
) -> Result<()> {
    let config = resolve_config(config_path, document, database, &run)?;
    let document = require_document(&config)?;
    let database = config.database.as_deref().ok_or_else(|| {
        NomenError::config_error(
            "No database given. Pass --database or set `database` in the config file",
        )
    })?;

    if !database.is_file() {
        return Err(NomenError::SchemaMissing {
            target: database.display().to_string(),
        });
    }

    let mut store = SqliteStore::open(database)?;
    store.require_schema()?;

    if run.format == OutputFormat::Human {
        print_plan(document, &store.describe());
    }

    if !assume_yes && !confirm(&store.describe()) {
        println!("{}", "Import cancelled".yellow());
        info!("Import cancelled by user");
        return Ok(());
    }

    let summary = run_import(&config, document, &mut store, run.format)?;
    print_summary(&summary, run.format)
}

/// Import a document into memory and report, without touching any database
pub fn inspect_command(
    config_path: Option<&Path>,
    document: Option<PathBuf>,
    run: RunArgs,
) -> Result<()> {
    let config = resolve_config(config_path, document, None, &run)?;
    let document = require_document(&config)?;

    let mut store = MemoryStore::new();
    let summary = run_import(&config, document, &mut store, run.format)?;
    print_summary(&summary, run.format)
}

pub fn version_command() {
    println!("{} {}", "nomen".bold(), nomen_core::VERSION);
    println!("Nomenclature importer for hierarchical ICD-10 tabular documents");
}
