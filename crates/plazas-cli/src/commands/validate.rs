//! `plazas validate` command implementation

use crate::commands::blocking;
use crate::config::Config;
use crate::error::Result;
use colored::Colorize;
use tracing::info;

/// Validate the configured source CSV
pub async fn run(config: Config) -> Result<()> {
    let source = config.source_path().to_path_buf();
    let summary = {
        let source = source.clone();
        blocking(move || Ok(plazas_core::validate_csv(&source)?)).await?
    };
    info!(rows = summary.rows, "Validation passed");

    println!(
        "{} {} is valid: {} rows",
        "✓".green(),
        source.display(),
        summary.rows
    );
    if !summary.extra_columns.is_empty() {
        println!(
            "  Ignored columns: {}",
            summary.extra_columns.join(", ").yellow()
        );
    }
    Ok(())
}
