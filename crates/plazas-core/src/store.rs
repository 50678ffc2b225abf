//! Store handle
//!
//! A [`Store`] is an open, read-only connection to a built `plazas` database.
//! It is created by [`crate::ingest::ensure_store`] and owned by the caller;
//! there is no process-wide cached connection. Readers that need concurrency
//! open one handle each.

use crate::error::{PlazasError, Result};
use crate::filter::NumericRange;
use crate::record::{Column, TABLE_NAME};
use rusqlite::functions::FunctionFlags;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// SQL scalar function folding text to Unicode lowercase.
///
/// SQLite's built-in `lower()` only folds ASCII, which misses accented names.
pub(crate) const FOLD_FUNCTION: &str = "plazas_fold";

/// Single-row table recording which source file a store was built from.
pub(crate) const SOURCE_TABLE: &str = "plazas_source";

/// Secondary indexes backing the filter predicates.
pub(crate) const INDEXES: [(&str, Column); 5] = [
    ("idx_plazas_specialty", Column::Specialty),
    ("idx_plazas_ccaa", Column::Ccaa),
    ("idx_plazas_province", Column::Province),
    ("idx_plazas_city", Column::City),
    ("idx_plazas_order", Column::LastYearOrderMax),
];

/// How the handle came to be: a fresh build or an existing up-to-date store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreOrigin {
    Rebuilt,
    Reused,
}

/// Identity of the CSV a store was built from: canonical path and size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFingerprint {
    pub path: String,
    pub size: u64,
}

impl SourceFingerprint {
    /// Fingerprint of the file currently at `source`.
    pub fn of(source: &Path) -> Result<Self> {
        let canonical = std::fs::canonicalize(source).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PlazasError::MissingSource(source.to_path_buf()),
            _ => PlazasError::Io(e),
        })?;
        let size = std::fs::metadata(&canonical)?.len();
        Ok(Self {
            path: canonical.to_string_lossy().into_owned(),
            size,
        })
    }
}

/// Read-only handle on a built store.
#[derive(Debug)]
pub struct Store {
    conn: Connection,
    path: PathBuf,
    origin: StoreOrigin,
}

impl Store {
    /// Open an existing store.
    ///
    /// Fails with [`PlazasError::InvalidStore`] if the file is missing, is not
    /// a SQLite database, or has no `plazas` table.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(PlazasError::invalid_store(path, "store file does not exist"));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| PlazasError::invalid_store(path, e.to_string()))?;

        let has_table = table_exists(&conn, TABLE_NAME)
            .map_err(|e| PlazasError::invalid_store(path, e.to_string()))?;
        if !has_table {
            return Err(PlazasError::invalid_store(
                path,
                format!("table '{TABLE_NAME}' not found"),
            ));
        }

        register_functions(&conn)?;
        debug!(store = %path.display(), "Opened store");

        Ok(Self {
            conn,
            path: path.to_path_buf(),
            origin: StoreOrigin::Reused,
        })
    }

    pub(crate) fn with_origin(mut self, origin: StoreOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Path of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn origin(&self) -> StoreOrigin {
        self.origin
    }

    /// Total number of rows in the store
    pub fn row_count(&self) -> Result<u64> {
        let count: i64 =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {TABLE_NAME}"), [], |row| {
                    row.get(0)
                })?;
        Ok(count.unsigned_abs())
    }

    /// Fingerprint recorded at build time, `None` for stores that carry none.
    pub fn source_fingerprint(&self) -> Result<Option<SourceFingerprint>> {
        if !table_exists(&self.conn, SOURCE_TABLE)? {
            return Ok(None);
        }
        let sql = format!("SELECT source_path, source_size FROM {SOURCE_TABLE} LIMIT 1");
        let recorded = self
            .conn
            .query_row(&sql, [], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })
            .optional()?;
        Ok(recorded.map(|(path, size)| SourceFingerprint {
            path,
            size: size.unsigned_abs(),
        }))
    }

    /// Whether this store was built from the file currently at `source`.
    pub fn is_built_from(&self, source: &Path) -> Result<bool> {
        let current = SourceFingerprint::of(source)?;
        Ok(self.source_fingerprint()?.as_ref() == Some(&current))
    }

    /// Sorted, non-null distinct values of a categorical column.
    pub fn distinct_values(&self, column: Column) -> Result<Vec<String>> {
        if !column.is_categorical() {
            return Err(PlazasError::invalid_argument(format!(
                "column '{column}' is not categorical"
            )));
        }

        let sql = format!(
            "SELECT DISTINCT {column} FROM {TABLE_NAME} WHERE {column} IS NOT NULL ORDER BY {column}"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let values = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(values)
    }

    /// Observed `(min, max)` of `last_year_order_max`
    pub fn order_bounds(&self) -> Result<Option<NumericRange>> {
        self.bounds(Column::LastYearOrderMax)
    }

    /// Observed `(min, max)` of `total_places`
    pub fn places_bounds(&self) -> Result<Option<NumericRange>> {
        self.bounds(Column::TotalPlaces)
    }

    fn bounds(&self, column: Column) -> Result<Option<NumericRange>> {
        let sql = format!(
            "SELECT MIN({column}), MAX({column}) FROM {TABLE_NAME} WHERE {column} IS NOT NULL"
        );
        let (low, high): (Option<i64>, Option<i64>) = self
            .conn
            .query_row(&sql, [], |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok(low.zip(high).map(|(low, high)| NumericRange::new(low, high)))
    }
}

fn table_exists(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn register_functions(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        FOLD_FUNCTION,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let folded = match ctx.get_raw(0) {
                ValueRef::Text(bytes) => Some(String::from_utf8_lossy(bytes).to_lowercase()),
                _ => None,
            };
            Ok(folded)
        },
    )?;
    Ok(())
}

// ============================================================================
// Schema
// ============================================================================

pub(crate) fn create_table_sql() -> String {
    let columns: Vec<String> = Column::ALL
        .iter()
        .map(|column| format!("{} {}", column.as_str(), column.sql_type()))
        .collect();
    format!("CREATE TABLE {TABLE_NAME} ({})", columns.join(", "))
}

pub(crate) fn create_source_table_sql() -> String {
    format!("CREATE TABLE {SOURCE_TABLE} (source_path TEXT NOT NULL, source_size INTEGER NOT NULL)")
}

pub(crate) fn insert_source_sql() -> String {
    format!("INSERT INTO {SOURCE_TABLE} (source_path, source_size) VALUES (?1, ?2)")
}

pub(crate) fn create_indexes_sql() -> String {
    INDEXES
        .iter()
        .map(|(name, column)| format!("CREATE INDEX {name} ON {TABLE_NAME}({column});"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn insert_sql() -> String {
    let names: Vec<&str> = Column::ALL.iter().map(|c| c.as_str()).collect();
    let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("?{i}")).collect();
    format!(
        "INSERT INTO {TABLE_NAME} ({}) VALUES ({})",
        names.join(", "),
        placeholders.join(", ")
    )
}
