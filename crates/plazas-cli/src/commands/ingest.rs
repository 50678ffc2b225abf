//! `plazas ingest` command implementation
//!
//! Builds the store when it is missing or older than the source; `--force`
//! rebuilds unconditionally.

use crate::commands::blocking;
use crate::config::Config;
use crate::error::Result;
use colored::Colorize;
use plazas_core::StoreOrigin;

/// Ensure (or force) the store
pub async fn run(config: Config, force: bool) -> Result<()> {
    let (origin, rows, path) = blocking(move || {
        let source = config.source_path();
        let store_path = config.store_path();
        let store = if force {
            plazas_core::rebuild_store(source, &store_path)?
        } else {
            plazas_core::ensure_store(source, &store_path)?
        };
        Ok((store.origin(), store.row_count()?, store.path().to_path_buf()))
    })
    .await?;

    match origin {
        StoreOrigin::Rebuilt => println!(
            "{} Store rebuilt: {} rows in {}",
            "✓".green(),
            rows,
            path.display().to_string().cyan()
        ),
        StoreOrigin::Reused => println!(
            "{} Store up to date: {} rows in {}",
            "✓".green(),
            rows,
            path.display().to_string().cyan()
        ),
    }
    Ok(())
}
