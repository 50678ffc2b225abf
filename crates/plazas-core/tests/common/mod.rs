//! Test fixtures for plazas-core integration tests
//!
//! [`RowFixture`] builds one CSV data row with a fluent API and
//! [`Dataset`] writes a source CSV into a temporary directory.

#![allow(dead_code)]

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

pub const HEADER: &str = "specialty,search_name,ccaa,province,city,center,total_places,last_year,last_year_order_max,last_year_orders";

// ============================================================================
// Row Fixtures
// ============================================================================

/// Builder for one CSV data row; every field defaults to blank.
#[derive(Debug, Clone, Default)]
pub struct RowFixture {
    specialty: String,
    ccaa: String,
    province: String,
    city: String,
    center: String,
    total_places: String,
    last_year: String,
    order_max: String,
    orders: String,
}

impl RowFixture {
    pub fn new(specialty: impl Into<String>) -> Self {
        Self {
            specialty: specialty.into(),
            ..Default::default()
        }
    }

    pub fn with_location(
        mut self,
        ccaa: impl Into<String>,
        province: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        self.ccaa = ccaa.into();
        self.province = province.into();
        self.city = city.into();
        self
    }

    pub fn with_center(mut self, center: impl Into<String>) -> Self {
        self.center = center.into();
        self
    }

    pub fn with_places(mut self, places: i64) -> Self {
        self.total_places = places.to_string();
        self
    }

    pub fn with_year(mut self, year: i64) -> Self {
        self.last_year = year.to_string();
        self
    }

    pub fn with_order_max(mut self, order: i64) -> Self {
        self.order_max = order.to_string();
        self
    }

    pub fn with_raw_order_max(mut self, raw: impl Into<String>) -> Self {
        self.order_max = raw.into();
        self
    }

    pub fn with_orders(mut self, orders: impl Into<String>) -> Self {
        self.orders = orders.into();
        self
    }

    /// Render as a CSV line (without newline).
    pub fn to_line(&self) -> String {
        let fields = [
            self.specialty.as_str(),
            self.specialty.as_str(),
            self.ccaa.as_str(),
            self.province.as_str(),
            self.city.as_str(),
            self.center.as_str(),
            self.total_places.as_str(),
            self.last_year.as_str(),
            self.order_max.as_str(),
            self.orders.as_str(),
        ];
        fields.map(quote).join(",")
    }
}

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn render(rows: &[RowFixture]) -> String {
    let mut text = String::from(HEADER);
    text.push('\n');
    for row in rows {
        text.push_str(&row.to_line());
        text.push('\n');
    }
    text
}

// ============================================================================
// Dataset
// ============================================================================

/// A source CSV inside its own temporary directory.
pub struct Dataset {
    dir: TempDir,
    source: PathBuf,
}

impl Dataset {
    pub fn new(rows: &[RowFixture]) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let source = dir.path().join("plazas_orden_ultimo_ano.csv");
        let dataset = Self { dir, source };
        dataset.write(rows);
        dataset
    }

    /// Overwrite the source with `rows`.
    pub fn write(&self, rows: &[RowFixture]) {
        fs::write(&self.source, render(rows)).expect("Failed to write source CSV");
    }

    /// Write another source CSV named `name` next to this one.
    pub fn sibling(&self, name: &str, rows: &[RowFixture]) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, render(rows)).expect("Failed to write sibling CSV");
        path
    }

    pub fn write_raw(&self, text: &str) {
        fs::write(&self.source, text).expect("Failed to write source CSV");
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn store(&self) -> PathBuf {
        self.dir.path().join("plazas.db")
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

/// Set the modification time of `path` to `age` before now.
pub fn set_age(path: &Path, age: Duration) {
    let when = SystemTime::now() - age;
    File::options()
        .write(true)
        .open(path)
        .expect("Failed to open file")
        .set_modified(when)
        .expect("Failed to set modification time");
}

/// Mixed sample: three specialties over two cycles, one row with no ranking.
pub fn sample_rows() -> Vec<RowFixture> {
    vec![
        RowFixture::new("CARDIOLOGÍA")
            .with_location("ANDALUCÍA", "SEVILLA", "SEVILLA")
            .with_center("H. U. VIRGEN DEL ROCÍO")
            .with_places(4)
            .with_year(2025)
            .with_order_max(2100)
            .with_orders("[1500, 2100]"),
        RowFixture::new("CARDIOLOGÍA")
            .with_location("MADRID", "MADRID", "MADRID")
            .with_center("H. G. U. GREGORIO MARAÑÓN")
            .with_places(6)
            .with_year(2025)
            .with_order_max(900),
        RowFixture::new("CARDIOLOGÍA")
            .with_location("CATALUÑA", "BARCELONA", "BARCELONA")
            .with_center("H. CLÍNIC")
            .with_places(5)
            .with_year(2025)
            .with_order_max(1400),
        RowFixture::new("CARDIOLOGÍA")
            .with_location("GALICIA", "A CORUÑA", "SANTIAGO DE COMPOSTELA")
            .with_center("C. H. U. DE SANTIAGO")
            .with_places(2)
            .with_year(2025)
            .with_order_max(3300),
        RowFixture::new("DERMATOLOGÍA")
            .with_location("ANDALUCÍA", "MÁLAGA", "MÁLAGA")
            .with_center("H. REGIONAL DE MÁLAGA")
            .with_places(2)
            .with_year(2025)
            .with_order_max(450),
        RowFixture::new("DERMATOLOGÍA")
            .with_location("CASTILLA Y LEÓN", "ÁVILA", "ÁVILA")
            .with_center("H. NUESTRA SEÑORA DE SONSOLES")
            .with_places(1)
            .with_year(2024),
        RowFixture::new("PEDIATRÍA")
            .with_location("MADRID", "MADRID", "GETAFE")
            .with_center("H. U. DE GETAFE")
            .with_places(8)
            .with_year(2024)
            .with_order_max(6400),
        RowFixture::new("PEDIATRÍA")
            .with_location("ARAGÓN", "ZARAGOZA", "ZARAGOZA")
            .with_center("H. U. MIGUEL SERVET")
            .with_places(7)
            .with_year(2025)
            .with_order_max(5200),
    ]
}
