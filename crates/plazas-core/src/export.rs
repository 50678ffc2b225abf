//! Export formatters for a result page
//!
//! Every format carries the ten columns in storage order.

use crate::error::{PlazasError, Result};
use crate::record::{Column, PlacementRecord};
use rust_xlsxwriter::{ColNum, Format, RowNum, Workbook};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Interchange format of an exported page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
    /// Excel workbook with a single sheet
    Xlsx,
}

impl ExportFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    /// File name offered when the caller gives none.
    pub fn default_file_name(self) -> String {
        format!("plazas_filtradas.{}", self.extension())
    }

    /// Format implied by a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        ext.parse().ok()
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = PlazasError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "xlsx" | "excel" => Ok(ExportFormat::Xlsx),
            other => Err(PlazasError::invalid_argument(format!(
                "unknown export format '{other}'; expected csv, json or xlsx"
            ))),
        }
    }
}

/// CSV with the ten column names as header; absent values are empty fields.
pub fn to_csv(rows: &[PlacementRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(Column::ALL.iter().map(|c| c.as_str()))?;
    for row in rows {
        writer.write_record(
            Column::ALL
                .iter()
                .map(|column| row.value(*column).unwrap_or_default()),
        )?;
    }
    writer
        .into_inner()
        .map_err(|e| PlazasError::Io(e.into_error()))
}

/// JSON array of objects keyed by column name; absent values are `null`.
pub fn to_json(rows: &[PlacementRecord]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(rows)?)
}

/// Name of the worksheet in exported workbooks.
pub const XLSX_SHEET_NAME: &str = "plazas";

/// Workbook with a bold header row of column names, then one row per record.
/// Integer columns are numeric cells; absent values are left blank.
pub fn to_xlsx(rows: &[PlacementRecord]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(XLSX_SHEET_NAME)?;

    for (col, column) in Column::ALL.iter().enumerate() {
        sheet.write_string_with_format(0, col_num(col), column.as_str(), &header)?;
    }

    for (index, record) in rows.iter().enumerate() {
        let row = RowNum::try_from(index + 1).map_err(|_| {
            PlazasError::invalid_argument(format!("too many rows for a worksheet: {}", rows.len()))
        })?;
        for (col, column) in Column::ALL.iter().enumerate() {
            let col = col_num(col);
            let integer = match column {
                Column::TotalPlaces => record.total_places,
                Column::LastYear => record.last_year,
                Column::LastYearOrderMax => record.last_year_order_max,
                _ => None,
            };
            if let Some(value) = integer {
                sheet.write_number(row, col, value as f64)?;
            } else if let Some(text) = record.value(*column) {
                sheet.write_string(row, col, text)?;
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Column index of the `i`-th of the ten columns.
fn col_num(i: usize) -> ColNum {
    ColNum::try_from(i).unwrap_or(ColNum::MAX)
}

pub fn export(rows: &[PlacementRecord], format: ExportFormat) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Csv => to_csv(rows),
        ExportFormat::Json => to_json(rows),
        ExportFormat::Xlsx => to_xlsx(rows),
    }
}

/// Export `rows` to `path`, replacing any existing file.
pub fn write_export(rows: &[PlacementRecord], format: ExportFormat, path: &Path) -> Result<()> {
    let bytes = export(rows, format)?;
    fs::write(path, &bytes)?;
    info!(
        path = %path.display(),
        rows = rows.len(),
        format = %format,
        "Exported page"
    );
    Ok(())
}
