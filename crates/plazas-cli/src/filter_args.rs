//! Filter flags shared by `query` and `summary`

use crate::error::Result;
use clap::Args;
use plazas_core::{FilterSpec, NumericRange, OrderPreset, YearFilter};
use std::path::PathBuf;
use tracing::debug;

/// Filter criteria. Every flag is optional; with none the whole store matches.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Accepted specialty (repeatable)
    #[arg(long)]
    pub specialty: Vec<String>,

    /// Accepted autonomous community (repeatable)
    #[arg(long)]
    pub ccaa: Vec<String>,

    /// Accepted province (repeatable)
    #[arg(long)]
    pub province: Vec<String>,

    /// Case-insensitive text the province must contain
    #[arg(long)]
    pub province_text: Option<String>,

    /// Accepted city (repeatable)
    #[arg(long)]
    pub city: Vec<String>,

    /// Case-insensitive text the city must contain
    #[arg(long)]
    pub city_text: Option<String>,

    /// Case-insensitive text the center must contain
    #[arg(long)]
    pub center_text: Option<String>,

    /// Cycle year, or "all"
    #[arg(long)]
    pub year: Option<YearFilter>,

    /// Inclusive total_places range, LOW..HIGH
    #[arg(long, value_name = "LOW..HIGH")]
    pub places: Option<NumericRange>,

    /// Inclusive last_year_order_max range, LOW..HIGH
    #[arg(long, value_name = "LOW..HIGH")]
    pub order: Option<NumericRange>,

    /// Named order range (">= 6000", "0 - 1000", ...); overrides --order
    #[arg(long, value_name = "LABEL")]
    pub order_preset: Option<OrderPreset>,

    /// JSON filter file; flags given on the command line replace its values
    #[arg(long, value_name = "FILE")]
    pub filter_file: Option<PathBuf>,
}

impl FilterArgs {
    /// Resolve the filter file (if any) and the flags into one spec.
    pub fn to_spec(&self) -> Result<FilterSpec> {
        let mut spec = match &self.filter_file {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                let spec: FilterSpec = serde_json::from_str(&text)?;
                debug!(path = %path.display(), "Loaded filter file");
                spec
            }
            None => FilterSpec::default(),
        };
        self.apply(&mut spec);
        Ok(spec)
    }

    fn apply(&self, spec: &mut FilterSpec) {
        replace_set(&mut spec.specialties, &self.specialty);
        replace_set(&mut spec.ccaas, &self.ccaa);
        replace_set(&mut spec.provinces, &self.province);
        replace_set(&mut spec.cities, &self.city);

        if self.province_text.is_some() {
            spec.province_text.clone_from(&self.province_text);
        }
        if self.city_text.is_some() {
            spec.city_text.clone_from(&self.city_text);
        }
        if self.center_text.is_some() {
            spec.center_text.clone_from(&self.center_text);
        }
        if let Some(year) = self.year {
            spec.year = year;
        }
        if let Some(places) = self.places {
            spec.total_places = Some(places);
        }
        if let Some(order) = self.order {
            spec.order_range = Some(order);
        }
        if let Some(preset) = self.order_preset {
            spec.order_preset = preset;
        }
    }
}

fn replace_set(target: &mut Vec<String>, flags: &[String]) {
    if !flags.is_empty() {
        *target = flags.to_vec();
    }
}
