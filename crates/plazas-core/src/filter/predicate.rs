//! Structured WHERE clause
//!
//! Each supported criterion is one [`Clause`] variant. A [`Predicate`] renders
//! its clauses in insertion order and yields the bound parameters in the same
//! order, so the count, page and aggregate queries all embed the exact same
//! text and bindings.

use super::NumericRange;
use crate::record::Column;
use crate::store::FOLD_FUNCTION;
use rusqlite::types::Value;

/// One condition of a predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// `column IN (?, ...)`
    InSet { column: Column, values: Vec<String> },
    /// Case-insensitive literal substring test. `needle` is already folded.
    Contains { column: Column, needle: String },
    /// `column = ?`
    Equals { column: Column, value: i64 },
    /// `column BETWEEN ? AND ?`, bounds inclusive
    Between { column: Column, range: NumericRange },
}

impl Clause {
    fn render(&self) -> String {
        match self {
            Clause::InSet { column, values } => {
                let placeholders = vec!["?"; values.len()].join(", ");
                format!("{column} IN ({placeholders})")
            }
            Clause::Contains { column, .. } => {
                format!("instr({FOLD_FUNCTION}({column}), ?) > 0")
            }
            Clause::Equals { column, .. } => format!("{column} = ?"),
            Clause::Between { column, .. } => format!("{column} BETWEEN ? AND ?"),
        }
    }

    fn bind(&self, params: &mut Vec<Value>) {
        match self {
            Clause::InSet { values, .. } => {
                params.extend(values.iter().cloned().map(Value::Text));
            }
            Clause::Contains { needle, .. } => params.push(Value::Text(needle.clone())),
            Clause::Equals { value, .. } => params.push(Value::Integer(*value)),
            Clause::Between { range, .. } => {
                params.push(Value::Integer(range.low));
                params.push(Value::Integer(range.high));
            }
        }
    }
}

/// Conjunction of clauses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a clause. An `InSet` with no values is no constraint and is dropped.
    pub fn push(&mut self, clause: Clause) {
        if let Clause::InSet { values, .. } = &clause {
            if values.is_empty() {
                return;
            }
        }
        self.clauses.push(clause);
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// `WHERE a AND b ...`, or an empty string when there are no clauses.
    pub fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            return String::new();
        }
        let rendered: Vec<String> = self.clauses.iter().map(Clause::render).collect();
        format!("WHERE {}", rendered.join(" AND "))
    }

    /// Bound values in placeholder order.
    pub fn params(&self) -> Vec<Value> {
        let mut params = Vec::new();
        for clause in &self.clauses {
            clause.bind(&mut params);
        }
        params
    }

    /// Predicate text and its parameters.
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        (self.where_clause(), self.params())
    }
}
