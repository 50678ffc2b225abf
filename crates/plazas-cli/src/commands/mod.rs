//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function. Store access is
//! blocking SQLite I/O and runs on the blocking thread pool; each command
//! opens its own store handle there.

pub mod ingest;
pub mod query;
pub mod status;
pub mod summary;
pub mod top;
pub mod validate;
pub mod values;

use crate::config::Config;
use crate::error::Result;
use plazas_core::Store;

/// Run `f` on the blocking pool.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

/// Up-to-date store for the configured source, rebuilding if stale.
pub(crate) fn open_store(config: &Config) -> Result<Store> {
    Ok(plazas_core::ensure_store(
        config.source_path(),
        &config.store_path(),
    )?)
}
