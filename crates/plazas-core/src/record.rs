//! Placement record model
//!
//! One [`PlacementRecord`] is one row of the `plazas` table. The column set is
//! fixed; [`Column`] names every column and is the only way column identifiers
//! reach generated SQL.

use crate::error::{PlazasError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the single table holding the dataset.
pub const TABLE_NAME: &str = "plazas";

/// Columns of the `plazas` table, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Specialty,
    SearchName,
    Ccaa,
    Province,
    City,
    Center,
    TotalPlaces,
    LastYear,
    LastYearOrderMax,
    LastYearOrders,
}

impl Column {
    /// Every column in storage order. Also the page projection.
    pub const ALL: [Column; 10] = [
        Column::Specialty,
        Column::SearchName,
        Column::Ccaa,
        Column::Province,
        Column::City,
        Column::Center,
        Column::TotalPlaces,
        Column::LastYear,
        Column::LastYearOrderMax,
        Column::LastYearOrders,
    ];

    /// Columns that must hold an integer or be absent.
    pub const INTEGER: [Column; 3] = [
        Column::TotalPlaces,
        Column::LastYear,
        Column::LastYearOrderMax,
    ];

    /// Column name as it appears in the CSV header and in the store.
    pub const fn as_str(self) -> &'static str {
        match self {
            Column::Specialty => "specialty",
            Column::SearchName => "search_name",
            Column::Ccaa => "ccaa",
            Column::Province => "province",
            Column::City => "city",
            Column::Center => "center",
            Column::TotalPlaces => "total_places",
            Column::LastYear => "last_year",
            Column::LastYearOrderMax => "last_year_order_max",
            Column::LastYearOrders => "last_year_orders",
        }
    }

    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Column::TotalPlaces | Column::LastYear | Column::LastYearOrderMax
        )
    }

    /// Text columns that make sense as facets (distinct values, grouping).
    ///
    /// `last_year_orders` is an opaque serialized list and is excluded.
    pub const fn is_categorical(self) -> bool {
        !self.is_integer() && !matches!(self, Column::LastYearOrders)
    }

    /// SQLite column affinity.
    pub const fn sql_type(self) -> &'static str {
        if self.is_integer() {
            "INTEGER"
        } else {
            "TEXT"
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Column {
    type Err = PlazasError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Column::ALL
            .into_iter()
            .find(|column| column.as_str() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Column::ALL.iter().map(|c| c.as_str()).collect();
                PlazasError::invalid_argument(format!(
                    "unknown column '{}'; expected one of: {}",
                    s,
                    known.join(", ")
                ))
            })
    }
}

/// One placement offer.
///
/// Absent values are `None`, never an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub specialty: Option<String>,
    pub search_name: Option<String>,
    pub ccaa: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
    pub center: Option<String>,
    pub total_places: Option<i64>,
    pub last_year: Option<i64>,
    /// Highest applicant ranking admitted in the last cycle
    pub last_year_order_max: Option<i64>,
    /// Serialized list of historical order numbers, kept verbatim
    pub last_year_orders: Option<String>,
}

impl PlacementRecord {
    /// Map a row whose projection is [`Column::ALL`] in order.
    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            specialty: row.get(0)?,
            search_name: row.get(1)?,
            ccaa: row.get(2)?,
            province: row.get(3)?,
            city: row.get(4)?,
            center: row.get(5)?,
            total_places: row.get(6)?,
            last_year: row.get(7)?,
            last_year_order_max: row.get(8)?,
            last_year_orders: row.get(9)?,
        })
    }

    /// Textual value of a column, `None` when absent.
    pub fn value(&self, column: Column) -> Option<String> {
        match column {
            Column::Specialty => self.specialty.clone(),
            Column::SearchName => self.search_name.clone(),
            Column::Ccaa => self.ccaa.clone(),
            Column::Province => self.province.clone(),
            Column::City => self.city.clone(),
            Column::Center => self.center.clone(),
            Column::TotalPlaces => self.total_places.map(|v| v.to_string()),
            Column::LastYear => self.last_year.map(|v| v.to_string()),
            Column::LastYearOrderMax => self.last_year_order_max.map(|v| v.to_string()),
            Column::LastYearOrders => self.last_year_orders.clone(),
        }
    }
}

// ============================================================================
// Coercion
// ============================================================================

/// Blank cells and the literal `NULL` (any case) mean "absent".
pub fn is_null_token(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null")
}

/// Text cell to an optional value; null tokens become `None`.
pub fn to_text(raw: Option<&str>) -> Option<String> {
    raw.filter(|value| !is_null_token(value))
        .map(str::to_string)
}

/// Integer cell to an optional value; anything unparsable becomes `None`.
pub fn to_int(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
}

/// Whether a cell is acceptable in an integer column.
pub fn is_integer_or_null(raw: &str) -> bool {
    is_null_token(raw) || raw.trim().parse::<i64>().is_ok()
}
