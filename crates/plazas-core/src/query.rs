//! Query executor and pager
//!
//! Count, page and aggregate queries all embed the same [`Predicate`]; only
//! the projection, grouping and limits differ.

use crate::error::Result;
use crate::filter::{Clause, FilterSpec, NumericRange, Predicate, YearFilter};
use crate::pagination::{clamp_page, page_offset, total_pages, PageInfo};
use crate::record::{Column, PlacementRecord, TABLE_NAME};
use crate::store::Store;
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use serde::Serialize;
use std::num::NonZeroU32;
use tracing::{debug, instrument};

/// Groups returned by the default summary.
pub const DEFAULT_SUMMARY_LIMIT: usize = 5;

/// Rows returned per specialty by [`Store::top_by_specialty`].
pub const TOP_PER_SPECIALTY: usize = 3;

/// Page ordering: unknown rankings last, then highest ranking first. `rowid`
/// keeps ties in insertion order so paging is stable.
const PAGE_ORDER: &str = "(last_year_order_max IS NULL), last_year_order_max DESC, rowid ASC";

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageResult {
    pub rows: Vec<PlacementRecord>,
    pub pagination: PageInfo,
}

impl PageResult {
    pub fn total_count(&self) -> u64 {
        self.pagination.total_count
    }

    pub fn total_pages(&self) -> u64 {
        self.pagination.total_pages
    }
}

/// A value of the grouping column and how many matching rows carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    /// `None` groups the rows where the column is absent
    pub value: Option<String>,
    pub count: u64,
}

/// Best rows of one specialty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecialtyTop {
    pub specialty: String,
    pub rows: Vec<PlacementRecord>,
}

impl SpecialtyTop {
    pub fn has_data(&self) -> bool {
        !self.rows.is_empty()
    }
}

fn projection() -> String {
    Column::ALL
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Store {
    /// Build the predicate for `spec`, reading the order bounds only when a
    /// preset needs them.
    pub fn predicate_for(&self, spec: &FilterSpec) -> Result<Predicate> {
        let observed_max = if spec.needs_order_bounds() {
            self.order_bounds()?.map(|range| range.high)
        } else {
            None
        };
        if let Some(range) = spec.effective_order_range(observed_max) {
            if range.is_empty() {
                debug!(%range, "Order range is empty, nothing can match");
            }
        }
        Ok(spec.to_predicate(observed_max))
    }

    /// Rows matching `predicate`.
    pub fn count(&self, predicate: &Predicate) -> Result<u64> {
        let (where_clause, params) = predicate.to_sql();
        let sql = format!("SELECT COUNT(*) FROM {TABLE_NAME} {where_clause}");
        debug!(sql = %sql, "Count query");

        let count: i64 = self
            .connection()
            .query_row(&sql, params_from_iter(params), |row| row.get(0))?;
        Ok(count.unsigned_abs())
    }

    /// Rows `offset..offset + limit` of the ordered filtered set.
    pub fn fetch_rows(
        &self,
        predicate: &Predicate,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<PlacementRecord>> {
        let (where_clause, mut params) = predicate.to_sql();
        let sql = format!(
            "SELECT {} FROM {TABLE_NAME} {where_clause} ORDER BY {PAGE_ORDER} LIMIT ? OFFSET ?",
            projection()
        );
        params.push(Value::Integer(to_sql_int(limit)));
        params.push(Value::Integer(to_sql_int(offset)));
        debug!(sql = %sql, limit, offset, "Page query");

        let mut stmt = self.connection().prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(params), PlacementRecord::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Page `page` of the filtered set.
    ///
    /// Callers should keep `1 <= page <= total_pages`; a page outside that
    /// range yields no rows, with the counts still filled in.
    #[instrument(skip(self, predicate), fields(clauses = predicate.clauses().len()))]
    pub fn page(
        &self,
        predicate: &Predicate,
        page_size: NonZeroU32,
        page: u32,
    ) -> Result<PageResult> {
        let total = self.count(predicate)?;
        self.page_with_total(predicate, page_size, page, total)
    }

    /// Like [`Store::page`], but a requested page outside
    /// `1..=total_pages` is moved to the nearest valid page first. Counts once.
    pub fn page_clamped(
        &self,
        predicate: &Predicate,
        page_size: NonZeroU32,
        requested: u32,
    ) -> Result<PageResult> {
        let total = self.count(predicate)?;
        let page = clamp_page(requested, total_pages(total, page_size));
        if page != requested {
            debug!(requested, page, "Clamped page number");
        }
        self.page_with_total(predicate, page_size, page, total)
    }

    fn page_with_total(
        &self,
        predicate: &Predicate,
        page_size: NonZeroU32,
        page: u32,
        total: u64,
    ) -> Result<PageResult> {
        let pagination = PageInfo::new(page, page_size, total);
        let rows = match page_offset(page, page_size) {
            Some(offset) if offset < total => {
                self.fetch_rows(predicate, u64::from(page_size.get()), offset)?
            }
            _ => Vec::new(),
        };
        Ok(PageResult { rows, pagination })
    }

    /// The `n` most frequent values of `column` among matching rows.
    ///
    /// Ties keep the order in which each value first appears in the store.
    pub fn top_n(&self, predicate: &Predicate, column: Column, n: usize) -> Result<Vec<GroupCount>> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let (where_clause, mut params) = predicate.to_sql();
        let sql = format!(
            "SELECT {column}, COUNT(*) AS n FROM {TABLE_NAME} {where_clause} \
             GROUP BY {column} ORDER BY n DESC, MIN(rowid) ASC LIMIT ?"
        );
        params.push(Value::Integer(to_sql_int(n as u64)));
        debug!(sql = %sql, "Aggregate query");

        let mut stmt = self.connection().prepare(&sql)?;
        let groups = stmt
            .query_map(params_from_iter(params), |row| {
                let value: Value = row.get(0)?;
                let count: i64 = row.get(1)?;
                Ok(GroupCount {
                    value: value_to_text(value),
                    count: count.unsigned_abs(),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(groups)
    }

    /// Best `limit` rows per specialty for one cycle, in the requested
    /// specialty order. Rows without a ranking are skipped.
    #[instrument(skip(self, specialties), fields(specialties = specialties.len()))]
    pub fn top_by_specialty(
        &self,
        year: i64,
        specialties: &[String],
        limit: usize,
    ) -> Result<Vec<SpecialtyTop>> {
        let mut results = Vec::with_capacity(specialties.len());
        for specialty in specialties {
            let spec = FilterSpec {
                specialties: vec![specialty.clone()],
                year: YearFilter::Exact(year),
                ..Default::default()
            };
            let mut predicate = spec.to_predicate(None);
            // `BETWEEN` on the full i64 range excludes NULL rankings.
            predicate.push(Clause::Between {
                column: Column::LastYearOrderMax,
                range: NumericRange::new(i64::MIN, i64::MAX),
            });

            let rows = self.fetch_rows(&predicate, limit as u64, 0)?;
            results.push(SpecialtyTop {
                specialty: specialty.clone(),
                rows,
            });
        }
        Ok(results)
    }
}

fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) => Some(f.to_string()),
        Value::Text(s) => Some(s),
        Value::Blob(b) => Some(String::from_utf8_lossy(&b).into_owned()),
    }
}

// ============================================================================
// Core invocation surface
// ============================================================================

/// Filter, count and page in one call.
pub fn query_page(
    store: &Store,
    spec: &FilterSpec,
    page_size: NonZeroU32,
    page: u32,
) -> Result<PageResult> {
    let predicate = store.predicate_for(spec)?;
    store.page(&predicate, page_size, page)
}

/// Top-`n` aggregate of `column` under `spec`.
pub fn query_top_n(
    store: &Store,
    spec: &FilterSpec,
    column: Column,
    n: usize,
) -> Result<Vec<GroupCount>> {
    let predicate = store.predicate_for(spec)?;
    store.top_n(&predicate, column, n)
}

/// Default summary: the most frequent specialties under `spec`.
pub fn query_summary(store: &Store, spec: &FilterSpec) -> Result<Vec<GroupCount>> {
    query_top_n(store, spec, Column::Specialty, DEFAULT_SUMMARY_LIMIT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_follows_storage_order() {
        assert!(projection().starts_with("specialty, search_name, ccaa"));
        assert!(projection().ends_with("last_year_order_max, last_year_orders"));
    }

    #[test]
    fn test_value_to_text() {
        assert_eq!(value_to_text(Value::Null), None);
        assert_eq!(value_to_text(Value::Integer(7)).as_deref(), Some("7"));
        assert_eq!(
            value_to_text(Value::Text("CARDIO".to_string())).as_deref(),
            Some("CARDIO")
        );
    }

    #[test]
    fn test_to_sql_int_saturates() {
        assert_eq!(to_sql_int(5), 5);
        assert_eq!(to_sql_int(u64::MAX), i64::MAX);
    }
}
