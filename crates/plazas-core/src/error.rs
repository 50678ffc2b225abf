//! Error types for plazas-core
//!
//! Validation failures (`MissingSource`, `Schema`, `RowTypes`, `EmptyDataset`)
//! are unrecoverable at the ingestion boundary: no store is produced from an
//! invalid source.

use crate::record::Column;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for plazas-core operations
pub type Result<T> = std::result::Result<T, PlazasError>;

/// Number of row diagnostics rendered in an error message.
pub const MAX_DISPLAYED_VIOLATIONS: usize = 20;

/// Main error type for plazas-core
#[derive(Error, Debug)]
pub enum PlazasError {
    #[error("Source dataset not found: {}", .0.display())]
    MissingSource(PathBuf),

    #[error("Schema error: missing required column(s): {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("Row type error: {0}")]
    RowTypes(RowTypeErrors),

    #[error("Empty dataset: the header is valid but there are no data rows")]
    EmptyDataset,

    #[error("Invalid store '{}': {reason}", .path.display())]
    InvalidStore { path: PathBuf, reason: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
}

impl PlazasError {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create an invalid store error
    pub fn invalid_store(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidStore {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error came from validating the source dataset
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingSource(_) | Self::Schema { .. } | Self::RowTypes(_) | Self::EmptyDataset
        )
    }
}

/// A non-integer value found in an integer column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowViolation {
    /// 1-based line number; the header is line 1
    pub line: u64,
    pub column: Column,
    pub value: String,
}

impl fmt::Display for RowViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: column '{}' has non-integer value '{}'",
            self.line, self.column, self.value
        )
    }
}

/// Every row violation of one validation pass.
///
/// The message shows at most [`MAX_DISPLAYED_VIOLATIONS`] entries followed by
/// `+N more`; [`RowTypeErrors::total`] is always the full count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowTypeErrors {
    violations: Vec<RowViolation>,
}

impl RowTypeErrors {
    pub fn new(violations: Vec<RowViolation>) -> Self {
        Self { violations }
    }

    pub fn total(&self) -> usize {
        self.violations.len()
    }

    pub fn violations(&self) -> &[RowViolation] {
        &self.violations
    }

    /// The diagnostics that make it into the message.
    pub fn displayed(&self) -> &[RowViolation] {
        let shown = self.violations.len().min(MAX_DISPLAYED_VIOLATIONS);
        &self.violations[..shown]
    }

    /// How many diagnostics are summarized as `+N more`.
    pub fn hidden(&self) -> usize {
        self.total() - self.displayed().len()
    }
}

impl fmt::Display for RowTypeErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} non-integer value(s) in integer columns",
            self.total()
        )?;
        for violation in self.displayed() {
            write!(f, "\n  {violation}")?;
        }
        if self.hidden() > 0 {
            write!(f, "\n  +{} more", self.hidden())?;
        }
        Ok(())
    }
}
