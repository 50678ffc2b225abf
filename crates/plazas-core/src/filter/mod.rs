//! Filter query builder
//!
//! A [`FilterSpec`] is the structured request coming from the CLI (or any
//! other front end). [`FilterSpec::to_predicate`] turns it into a
//! [`Predicate`]: the clause kinds are fixed, user values only ever travel as
//! bound parameters, and column names come from [`Column`].
//!
//! Clause order is fixed (specialty, ccaa, province, province text, city,
//! city text, center text, year, places, order), so equal specs always
//! produce equal SQL and parameter lists.

mod predicate;
mod preset;

pub use predicate::{Clause, Predicate};
pub use preset::OrderPreset;

use crate::error::{PlazasError, Result};
use crate::record::Column;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Inclusive integer range.
///
/// Bounds are kept as given; a range with `low > high` is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NumericRange {
    pub low: i64,
    pub high: i64,
}

impl NumericRange {
    pub const fn new(low: i64, high: i64) -> Self {
        Self { low, high }
    }

    pub const fn is_empty(&self) -> bool {
        self.low > self.high
    }
}

impl fmt::Display for NumericRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.low, self.high)
    }
}

impl FromStr for NumericRange {
    type Err = PlazasError;

    /// Parses `LOW..HIGH`, `LOW..=HIGH` or `LOW-HIGH`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || {
            PlazasError::invalid_argument(format!(
                "invalid range '{s}'; expected LOW..HIGH with integer bounds"
            ))
        };

        let text = s.trim();
        let (low, high) = text
            .split_once("..=")
            .or_else(|| text.split_once(".."))
            .or_else(|| {
                // Skip a leading sign so "-5-10" is not split at the sign.
                let offset = usize::from(text.starts_with('-'));
                text[offset..]
                    .find('-')
                    .map(|i| (&text[..offset + i], &text[offset + i + 1..]))
            })
            .ok_or_else(invalid)?;

        let low: i64 = low.trim().parse().map_err(|_| invalid())?;
        let high: i64 = high.trim().parse().map_err(|_| invalid())?;
        if low > high {
            return Err(PlazasError::invalid_argument(format!(
                "invalid range '{s}': low bound {low} is above high bound {high}"
            )));
        }
        Ok(Self::new(low, high))
    }
}

/// Exact cycle year, or every year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum YearFilter {
    #[default]
    All,
    Exact(i64),
}

impl YearFilter {
    pub const fn year(self) -> Option<i64> {
        match self {
            YearFilter::All => None,
            YearFilter::Exact(year) => Some(year),
        }
    }
}

impl fmt::Display for YearFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearFilter::All => f.write_str("all"),
            YearFilter::Exact(year) => write!(f, "{year}"),
        }
    }
}

impl FromStr for YearFilter {
    type Err = PlazasError;

    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        if text.eq_ignore_ascii_case("all") || text.eq_ignore_ascii_case("todos") {
            return Ok(YearFilter::All);
        }
        text.parse::<i64>().map(YearFilter::Exact).map_err(|_| {
            PlazasError::invalid_argument(format!(
                "invalid year '{s}'; expected a year such as 2025 or 'all'"
            ))
        })
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum YearRepr {
    Exact(i64),
    Text(String),
}

impl Serialize for YearFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let repr = match self {
            YearFilter::All => YearRepr::Text("all".to_string()),
            YearFilter::Exact(year) => YearRepr::Exact(*year),
        };
        repr.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for YearFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match YearRepr::deserialize(deserializer)? {
            YearRepr::Exact(year) => Ok(YearFilter::Exact(year)),
            YearRepr::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Every criterion a query can carry. All fields are optional; the default
/// spec matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    pub specialties: Vec<String>,
    pub ccaas: Vec<String>,
    pub provinces: Vec<String>,
    pub province_text: Option<String>,
    pub cities: Vec<String>,
    pub city_text: Option<String>,
    pub center_text: Option<String>,
    pub year: YearFilter,
    pub total_places: Option<NumericRange>,
    pub order_range: Option<NumericRange>,
    pub order_preset: OrderPreset,
}

impl FilterSpec {
    /// Whether building the predicate needs the store's observed order max.
    pub fn needs_order_bounds(&self) -> bool {
        self.order_preset.requires_observed_max()
    }

    /// Order range actually applied.
    ///
    /// A non-custom preset overrides any explicit range.
    pub fn effective_order_range(&self, observed_max: Option<i64>) -> Option<NumericRange> {
        if self.order_preset.is_custom() {
            self.order_range
        } else {
            self.order_preset.expand(observed_max)
        }
    }

    /// Build the predicate. `observed_max` is the highest `last_year_order_max`
    /// in the store, consulted only by the `>=` presets.
    pub fn to_predicate(&self, observed_max: Option<i64>) -> Predicate {
        let mut predicate = Predicate::new();

        predicate.push(in_set(Column::Specialty, &self.specialties));
        predicate.push(in_set(Column::Ccaa, &self.ccaas));
        predicate.push(in_set(Column::Province, &self.provinces));
        push_contains(&mut predicate, Column::Province, self.province_text.as_deref());
        predicate.push(in_set(Column::City, &self.cities));
        push_contains(&mut predicate, Column::City, self.city_text.as_deref());
        push_contains(&mut predicate, Column::Center, self.center_text.as_deref());

        if let Some(year) = self.year.year() {
            predicate.push(Clause::Equals {
                column: Column::LastYear,
                value: year,
            });
        }

        if let Some(range) = self.total_places {
            predicate.push(Clause::Between {
                column: Column::TotalPlaces,
                range,
            });
        }

        if let Some(range) = self.effective_order_range(observed_max) {
            predicate.push(Clause::Between {
                column: Column::LastYearOrderMax,
                range,
            });
        }

        predicate
    }
}

fn in_set(column: Column, values: &[String]) -> Clause {
    Clause::InSet {
        column,
        values: values.to_vec(),
    }
}

fn push_contains(predicate: &mut Predicate, column: Column, text: Option<&str>) {
    let Some(needle) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return;
    };
    predicate.push(Clause::Contains {
        column,
        needle: needle.to_lowercase(),
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use rusqlite::types::Value;

    #[test]
    fn test_default_spec_has_no_clauses() {
        let predicate = FilterSpec::default().to_predicate(Some(9000));
        assert!(predicate.is_empty());
    }

    #[test]
    fn test_empty_sets_emit_nothing() {
        let spec = FilterSpec {
            specialties: vec![],
            cities: vec![],
            ..Default::default()
        };
        assert!(spec.to_predicate(None).is_empty());
    }

    #[test]
    fn test_whitespace_text_is_absent_and_text_is_trimmed() {
        let spec = FilterSpec {
            province_text: Some("   ".to_string()),
            city_text: Some("  Sevilla ".to_string()),
            ..Default::default()
        };
        let predicate = spec.to_predicate(None);
        assert_eq!(predicate.clauses().len(), 1);
        assert_eq!(
            predicate.clauses()[0],
            Clause::Contains {
                column: Column::City,
                needle: "sevilla".to_string()
            }
        );
    }

    #[test]
    fn test_year_sentinel_emits_nothing() {
        let all = FilterSpec {
            year: YearFilter::All,
            ..Default::default()
        };
        assert!(all.to_predicate(None).is_empty());

        let exact = FilterSpec {
            year: YearFilter::Exact(2024),
            ..Default::default()
        };
        let (sql, params) = exact.to_predicate(None).to_sql();
        assert_eq!(sql, "WHERE last_year = ?");
        assert_eq!(params, vec![Value::Integer(2024)]);
    }

    #[test]
    fn test_preset_overrides_explicit_range() {
        let spec = FilterSpec {
            order_range: Some(NumericRange::new(1, 2)),
            order_preset: OrderPreset::From3000To5000,
            ..Default::default()
        };
        assert_eq!(
            spec.effective_order_range(None),
            Some(NumericRange::new(3000, 5000))
        );

        let custom = FilterSpec {
            order_range: Some(NumericRange::new(1, 2)),
            ..Default::default()
        };
        assert_eq!(
            custom.effective_order_range(Some(10)),
            Some(NumericRange::new(1, 2))
        );
    }

    #[test]
    fn test_unresolvable_order_range_emits_nothing() {
        let spec = FilterSpec {
            order_preset: OrderPreset::AtLeast1000,
            ..Default::default()
        };
        assert!(spec.needs_order_bounds());
        assert!(spec.to_predicate(None).is_empty());
    }

    #[test]
    fn test_clause_order_is_fixed() {
        let spec = FilterSpec {
            specialties: vec!["CARDIO".to_string()],
            ccaas: vec!["ANDALUCIA".to_string()],
            provinces: vec!["SEVILLA".to_string()],
            province_text: Some("sev".to_string()),
            cities: vec!["SEVILLA".to_string()],
            city_text: Some("sev".to_string()),
            center_text: Some("virgen".to_string()),
            year: YearFilter::Exact(2025),
            total_places: Some(NumericRange::new(1, 5)),
            order_range: Some(NumericRange::new(100, 200)),
            order_preset: OrderPreset::Custom,
        };
        let columns: Vec<Column> = spec
            .to_predicate(None)
            .clauses()
            .iter()
            .map(|clause| match clause {
                Clause::InSet { column, .. }
                | Clause::Contains { column, .. }
                | Clause::Equals { column, .. }
                | Clause::Between { column, .. } => *column,
            })
            .collect();
        assert_eq!(
            columns,
            vec![
                Column::Specialty,
                Column::Ccaa,
                Column::Province,
                Column::Province,
                Column::City,
                Column::City,
                Column::Center,
                Column::LastYear,
                Column::TotalPlaces,
                Column::LastYearOrderMax,
            ]
        );
        assert_eq!(spec.to_predicate(None), spec.to_predicate(None));
    }

    #[test]
    fn test_range_parsing() {
        assert_eq!("10..20".parse::<NumericRange>().unwrap(), NumericRange::new(10, 20));
        assert_eq!("10..=20".parse::<NumericRange>().unwrap(), NumericRange::new(10, 20));
        assert_eq!("0-1000".parse::<NumericRange>().unwrap(), NumericRange::new(0, 1000));
        assert_eq!(" 5 .. 5 ".parse::<NumericRange>().unwrap(), NumericRange::new(5, 5));
        assert!("20..10".parse::<NumericRange>().is_err());
        assert!("abc".parse::<NumericRange>().is_err());
        assert!("10..".parse::<NumericRange>().is_err());
    }

    #[test]
    fn test_year_parsing() {
        assert_eq!("Todos".parse::<YearFilter>().unwrap(), YearFilter::All);
        assert_eq!("all".parse::<YearFilter>().unwrap(), YearFilter::All);
        assert_eq!("2023".parse::<YearFilter>().unwrap(), YearFilter::Exact(2023));
        assert!("last".parse::<YearFilter>().is_err());
    }

    #[test]
    fn test_spec_deserializes_from_partial_json() {
        let spec: FilterSpec = serde_json::from_str(
            r#"{"specialties": ["CARDIO"], "year": 2025, "order_preset": ">= 1000"}"#,
        )
        .unwrap();
        assert_eq!(spec.specialties, vec!["CARDIO".to_string()]);
        assert_eq!(spec.year, YearFilter::Exact(2025));
        assert_eq!(spec.order_preset, OrderPreset::AtLeast1000);
        assert!(spec.ccaas.is_empty());

        let all: FilterSpec = serde_json::from_str(r#"{"year": "Todos"}"#).unwrap();
        assert_eq!(all.year, YearFilter::All);

        let round: FilterSpec =
            serde_json::from_str(&serde_json::to_string(&spec).unwrap()).unwrap();
        assert_eq!(round, spec);
    }
}
