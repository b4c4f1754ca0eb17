//! Output formatting for import summaries

use colored::*;
use nomen_core::{ImportSummary, NomenError, Result};

use crate::OutputFormat;

pub fn print_summary(summary: &ImportSummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Human => {
            print_human(summary);
            Ok(())
        }
        OutputFormat::Json => print_json(summary),
    }
}

fn print_human(summary: &ImportSummary) {
    println!();
    if summary.is_consistent() {
        println!("{}", "Import complete".green().bold());
    } else {
        println!("{}", "Import complete with integrity warnings".yellow().bold());
    }
    print!("{summary}");

    for orphan in &summary.orphans {
        println!(
            "  {} {} (parent {} not found)",
            "orphan".yellow(),
            orphan.code,
            orphan.parent_code.dimmed()
        );
    }
}

fn print_json(summary: &ImportSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)
        .map_err(|e| NomenError::output_error(format!("Failed to serialize summary: {e}")))?;
    println!("{json}");
    Ok(())
}
