//! Ingestion pipeline
//!
//! Turns the source CSV into a `plazas` store. A rebuild is staged in a
//! temporary file next to the destination and renamed into place only after
//! the transaction commits, so a reader opening the store path sees either the
//! previous complete store or the new complete one.

use crate::error::{PlazasError, Result};
use crate::record::{to_int, to_text, Column};
use crate::store::{self, SourceFingerprint, Store, StoreOrigin};
use crate::validate::{csv_reader, validate_csv, HeaderIndex};
use rusqlite::types::Value;
use rusqlite::Connection;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};
use tracing::{debug, info, instrument, warn};

/// File name of the store when none is configured.
pub const DEFAULT_STORE_FILE: &str = "plazas.db";

/// Default store location: `plazas.db` in the source's directory.
pub fn default_store_path(source: &Path) -> PathBuf {
    match source.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(DEFAULT_STORE_FILE),
        _ => PathBuf::from(DEFAULT_STORE_FILE),
    }
}

/// Freshness of an existing store relative to its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    /// No store file yet
    Missing,
    /// Store older than the source
    Stale,
    /// Store modified at or after the source
    Fresh,
}

/// Compare modification times of `source` and `store`.
pub fn staleness(source: &Path, store: &Path) -> Result<Staleness> {
    let source_mtime = modified(source).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => PlazasError::MissingSource(source.to_path_buf()),
        _ => PlazasError::Io(e),
    })?;
    let store_mtime = match modified(store) {
        Ok(mtime) => mtime,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Staleness::Missing),
        Err(e) => return Err(e.into()),
    };

    if store_mtime >= source_mtime {
        Ok(Staleness::Fresh)
    } else {
        Ok(Staleness::Stale)
    }
}

fn modified(path: &Path) -> std::io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}

/// Return a handle on an up-to-date store, rebuilding it when needed.
///
/// A fresh store is reused untouched when it was built from this same source
/// file (canonical path and size). A fresh-looking store that cannot be opened
/// as a `plazas` store, or that was built from another file, is rebuilt.
#[instrument(skip_all, fields(source = %source.display(), store = %store_path.display()))]
pub fn ensure_store(source: &Path, store_path: &Path) -> Result<Store> {
    if !source.is_file() {
        return Err(PlazasError::MissingSource(source.to_path_buf()));
    }

    match staleness(source, store_path)? {
        Staleness::Fresh => match Store::open(store_path) {
            Ok(store) if store.is_built_from(source)? => {
                debug!("Store is up to date, reusing it");
                return Ok(store.with_origin(StoreOrigin::Reused));
            }
            Ok(_) => info!("Store was built from a different source, rebuilding"),
            Err(PlazasError::InvalidStore { reason, .. }) => {
                warn!(reason = %reason, "Existing store is unusable, rebuilding");
            }
            Err(e) => return Err(e),
        },
        Staleness::Stale => info!("Source is newer than the store, rebuilding"),
        Staleness::Missing => info!("No store found, building it"),
    }

    rebuild_store(source, store_path)
}

/// Rebuild the store from `source` unconditionally.
///
/// The source is validated first; nothing is written when validation fails.
#[instrument(skip_all, fields(source = %source.display(), store = %store_path.display()))]
pub fn rebuild_store(source: &Path, store_path: &Path) -> Result<Store> {
    let started = Instant::now();
    let summary = validate_csv(source)?;
    let fingerprint = SourceFingerprint::of(source)?;

    let parent = match store_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)?;

    let staging = tempfile::Builder::new()
        .prefix(".plazas-")
        .suffix(".db.partial")
        .tempfile_in(&parent)?;

    let inserted = populate(staging.path(), source, &fingerprint)?;
    if inserted != summary.rows {
        return Err(PlazasError::invalid_store(
            staging.path(),
            format!(
                "inserted {inserted} rows but validation counted {}",
                summary.rows
            ),
        ));
    }

    apply_store_permissions(staging.path(), store_path)?;
    staging
        .persist(store_path)
        .map_err(|e| PlazasError::Io(e.error))?;

    info!(
        rows = inserted,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Store rebuilt"
    );

    Ok(Store::open(store_path)?.with_origin(StoreOrigin::Rebuilt))
}

/// Write table, rows, indexes and the source fingerprint into the staging
/// database at `path`.
fn populate(path: &Path, source: &Path, fingerprint: &SourceFingerprint) -> Result<u64> {
    let mut conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode = DELETE; PRAGMA synchronous = NORMAL;")?;

    let mut reader = csv_reader(File::open(source)?);
    let header = HeaderIndex::from_headers(reader.headers()?)?;

    let tx = conn.transaction()?;
    tx.execute_batch(&store::create_table_sql())?;

    let mut rows = 0u64;
    {
        let mut insert = tx.prepare(&store::insert_sql())?;
        for record in reader.records() {
            let record = record?;
            let values = Column::ALL.map(|column| coerce(column, header.get(&record, column)));
            insert.execute(rusqlite::params_from_iter(values))?;
            rows += 1;
        }
    }

    tx.execute_batch(&store::create_indexes_sql())?;
    tx.execute_batch(&store::create_source_table_sql())?;
    tx.execute(
        &store::insert_source_sql(),
        rusqlite::params![fingerprint.path, i64::try_from(fingerprint.size).unwrap_or(i64::MAX)],
    )?;
    tx.commit()?;
    debug!(rows, "Staging store populated");

    conn.close().map_err(|(_, e)| PlazasError::Database(e))?;
    Ok(rows)
}

/// The staging file is created owner-only. Give the new store the mode of the
/// store it replaces, or `0644` for a first build.
#[cfg(unix)]
fn apply_store_permissions(staging: &Path, store_path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let permissions = fs::metadata(store_path)
        .map(|metadata| metadata.permissions())
        .unwrap_or_else(|_| fs::Permissions::from_mode(0o644));
    fs::set_permissions(staging, permissions)?;
    Ok(())
}

#[cfg(not(unix))]
fn apply_store_permissions(_staging: &Path, _store_path: &Path) -> Result<()> {
    Ok(())
}

fn coerce(column: Column, raw: Option<&str>) -> Value {
    if column.is_integer() {
        to_int(raw).map_or(Value::Null, Value::Integer)
    } else {
        to_text(raw).map_or(Value::Null, Value::Text)
    }
}
