//! `plazas query` command implementation
//!
//! Prints one page of matching placements, a status line and the
//! top-specialties summary. With `--format csv|json|xlsx` stdout carries only the
//! serialized page and the status line goes to stderr.

use crate::commands::{blocking, open_store};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::{format_records_table, format_summary_lines, page_status_line};
use crate::{FilterArgs, OutputFormat};
use colored::Colorize;
use plazas_core::export::{export, write_export};
use plazas_core::query::DEFAULT_SUMMARY_LIMIT;
use plazas_core::{Column, ExportFormat, GroupCount, PageResult};
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Options of one `plazas query` invocation
#[derive(Debug, Clone)]
pub struct QueryOptions {
    pub filters: FilterArgs,
    pub page: u32,
    pub page_size: Option<u32>,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub no_summary: bool,
}

/// Run the query command
pub async fn run(config: Config, options: QueryOptions) -> Result<()> {
    let spec = options.filters.to_spec()?;
    let config = config.with_overrides(None, None, options.page_size);
    config.validate()?;
    let page_size = config.page_size()?;
    let requested = options.page;
    let with_summary = !options.no_summary;

    let (page, summary) = blocking(move || {
        let store = open_store(&config)?;
        let predicate = store.predicate_for(&spec)?;
        let result = store.page_clamped(&predicate, page_size, requested)?;
        let summary = if with_summary {
            store.top_n(&predicate, Column::Specialty, DEFAULT_SUMMARY_LIMIT)?
        } else {
            Vec::new()
        };
        Ok((result, summary))
    })
    .await?;

    info!(
        total = page.total_count(),
        page = page.pagination.page,
        "Query complete"
    );

    match &options.output {
        Some(path) => write_to_file(&page, &summary, options.format, path),
        None => print_page(&page, &summary, options.format),
    }
}

/// Export format for `--output`: an explicit csv/json/xlsx `--format`, else
/// the file extension, else CSV.
fn export_format(format: OutputFormat, path: &Path) -> ExportFormat {
    format
        .export_format()
        .or_else(|| ExportFormat::from_path(path))
        .unwrap_or(ExportFormat::Csv)
}

fn write_to_file(
    page: &PageResult,
    summary: &[GroupCount],
    format: OutputFormat,
    path: &Path,
) -> Result<()> {
    let format = export_format(format, path);
    write_export(&page.rows, format, path)?;
    println!(
        "{} Exported {} rows ({}) to {}",
        "✓".green(),
        page.rows.len(),
        format,
        path.display().to_string().cyan()
    );
    println!("{}", page_status_line(&page.pagination, page.rows.len()));
    print_summary(summary);
    Ok(())
}

fn print_page(page: &PageResult, summary: &[GroupCount], format: OutputFormat) -> Result<()> {
    let status = page_status_line(&page.pagination, page.rows.len());
    match format {
        OutputFormat::Table => {
            print!("{}", format_records_table(&page.rows));
            println!("{status}");
            print_summary(summary);
        }
        OutputFormat::Csv | OutputFormat::Json | OutputFormat::Xlsx => {
            let format = export_format(format, Path::new(""));
            if format == ExportFormat::Xlsx && std::io::stdout().is_terminal() {
                return Err(CliError::invalid_argument(
                    "xlsx output is binary; use --output FILE or redirect stdout",
                ));
            }
            let bytes = export(&page.rows, format)?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            if format == ExportFormat::Json {
                writeln!(stdout)?;
            }
            stdout.flush()?;
            eprintln!("{status}");
        }
    }
    Ok(())
}

fn print_summary(summary: &[GroupCount]) {
    if summary.is_empty() {
        return;
    }
    println!();
    println!("{}", "Top specialties:".cyan().bold());
    print!("{}", format_summary_lines(summary));
}
