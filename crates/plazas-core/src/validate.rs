//! Schema validation for the source CSV
//!
//! Two checks run before anything touches the store:
//!
//! 1. The header must contain every column of [`Column::ALL`] (any order,
//!    extra columns ignored). A violation fails immediately with the sorted
//!    list of missing names.
//! 2. Every integer cell must parse or be blank/`NULL`. Violations are
//!    collected over the whole file and reported once, so an operator can fix
//!    many rows from a single pass.
//!
//! A file with a valid header and no data rows is rejected as well.

use crate::error::{PlazasError, Result, RowTypeErrors, RowViolation};
use crate::record::{is_integer_or_null, Column};
use csv::StringRecord;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, instrument, warn};

const UTF8_BOM: char = '\u{feff}';

/// Outcome of a successful validation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    /// Number of data rows (header excluded)
    pub rows: u64,
    /// Header columns outside the recognized set, in file order
    pub extra_columns: Vec<String>,
}

/// Validate the CSV file at `path`.
#[instrument(skip_all, fields(source = %path.display()))]
pub fn validate_csv(path: &Path) -> Result<ValidationSummary> {
    if !path.exists() {
        return Err(PlazasError::MissingSource(path.to_path_buf()));
    }
    let summary = validate_reader(File::open(path)?)?;
    debug!(rows = summary.rows, "Source CSV is valid");
    Ok(summary)
}

/// Validate CSV content from any reader.
pub fn validate_reader<R: Read>(reader: R) -> Result<ValidationSummary> {
    let mut reader = csv_reader(reader);
    let header = HeaderIndex::from_headers(reader.headers()?)?;

    let mut collector = ViolationCollector::default();
    let mut rows = 0u64;
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        rows += 1;
        collector.check(line_number(index), &header, &record);
    }

    collector.finish()?;
    if rows == 0 {
        return Err(PlazasError::EmptyDataset);
    }

    Ok(ValidationSummary {
        rows,
        extra_columns: header.extra,
    })
}

/// Line of the `index`-th data record, counting the header as line 1.
fn line_number(index: usize) -> u64 {
    index as u64 + 2
}

/// Reader configuration shared by validation and ingestion.
///
/// Short rows are accepted; their missing cells read as absent.
pub(crate) fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader)
}

/// Position of each recognized column in the header.
#[derive(Debug, Clone)]
pub(crate) struct HeaderIndex {
    positions: HashMap<Column, usize>,
    extra: Vec<String>,
}

impl HeaderIndex {
    /// Fails with [`PlazasError::Schema`] when a required column is missing.
    pub(crate) fn from_headers(headers: &StringRecord) -> Result<Self> {
        let mut positions = HashMap::new();
        let mut extra = Vec::new();

        for (position, raw) in headers.iter().enumerate() {
            let name = raw.trim_start_matches(UTF8_BOM).trim();
            match Column::ALL.into_iter().find(|c| c.as_str() == name) {
                Some(column) => {
                    positions.entry(column).or_insert(position);
                }
                None => extra.push(name.to_string()),
            }
        }

        let mut missing: Vec<String> = Column::ALL
            .into_iter()
            .filter(|column| !positions.contains_key(column))
            .map(|column| column.as_str().to_string())
            .collect();
        if !missing.is_empty() {
            missing.sort();
            warn!(missing = ?missing, "CSV header is missing required columns");
            return Err(PlazasError::Schema { missing });
        }

        if !extra.is_empty() {
            debug!(extra = ?extra, "Ignoring unrecognized CSV columns");
        }

        Ok(Self { positions, extra })
    }

    /// Raw cell for `column`, `None` when the row is too short.
    pub(crate) fn get<'r>(&self, record: &'r StringRecord, column: Column) -> Option<&'r str> {
        self.positions
            .get(&column)
            .and_then(|position| record.get(*position))
    }
}

/// Accumulates row violations until the scan is complete.
#[derive(Debug, Default)]
struct ViolationCollector {
    violations: Vec<RowViolation>,
}

impl ViolationCollector {
    fn check(&mut self, line: u64, header: &HeaderIndex, record: &StringRecord) {
        for column in Column::INTEGER {
            if let Some(raw) = header.get(record, column) {
                if !is_integer_or_null(raw) {
                    self.violations.push(RowViolation {
                        line,
                        column,
                        value: raw.to_string(),
                    });
                }
            }
        }
    }

    fn finish(self) -> Result<()> {
        if self.violations.is_empty() {
            return Ok(());
        }
        warn!(
            violations = self.violations.len(),
            "CSV rows contain non-integer values"
        );
        Err(PlazasError::RowTypes(RowTypeErrors::new(self.violations)))
    }
}
