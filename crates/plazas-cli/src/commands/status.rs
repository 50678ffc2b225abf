//! `plazas status` command implementation
//!
//! Reports freshness without rebuilding anything.

use crate::commands::blocking;
use crate::config::Config;
use crate::error::Result;
use chrono::{DateTime, Local};
use colored::Colorize;
use plazas_core::{Staleness, Store};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

struct Report {
    source: PathBuf,
    source_modified: Option<SystemTime>,
    store: PathBuf,
    store_modified: Option<SystemTime>,
    staleness: Option<Staleness>,
    rows: Option<u64>,
    same_source: bool,
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn format_time(time: Option<SystemTime>) -> String {
    match time {
        Some(time) => DateTime::<Local>::from(time)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => "missing".to_string(),
    }
}

/// Show source and store state
pub async fn run(config: Config) -> Result<()> {
    let report = blocking(move || {
        let source = config.source_path().to_path_buf();
        let store = config.store_path();
        let source_modified = modified(&source);
        let store_modified = modified(&store);

        let staleness = match source_modified {
            Some(_) => Some(plazas_core::staleness(&source, &store)?),
            None => None,
        };
        let opened = Store::open(&store).ok();
        let rows = opened.as_ref().and_then(|s| s.row_count().ok());
        let same_source = match (&opened, source_modified) {
            (Some(s), Some(_)) => s.is_built_from(&source).unwrap_or(false),
            _ => false,
        };

        Ok(Report {
            source,
            source_modified,
            store,
            store_modified,
            staleness,
            rows,
            same_source,
        })
    })
    .await?;

    println!("{}", "Source:".cyan().bold());
    println!("  Path:     {}", report.source.display());
    println!("  Modified: {}", format_time(report.source_modified));
    println!();
    println!("{}", "Store:".cyan().bold());
    println!("  Path:     {}", report.store.display());
    println!("  Modified: {}", format_time(report.store_modified));

    let state = match report.staleness {
        Some(Staleness::Fresh) if report.rows.is_some() && report.same_source => {
            "up to date".green()
        }
        Some(Staleness::Fresh) if report.rows.is_some() => {
            "built from another source (will be rebuilt)".yellow()
        }
        Some(Staleness::Fresh) => "unreadable (will be rebuilt)".yellow(),
        Some(Staleness::Stale) => "stale (will be rebuilt)".yellow(),
        Some(Staleness::Missing) => "not built".yellow(),
        None => "source missing".red(),
    };
    println!("  State:    {state}");
    if let Some(rows) = report.rows {
        println!("  Rows:     {rows}");
    }
    Ok(())
}
