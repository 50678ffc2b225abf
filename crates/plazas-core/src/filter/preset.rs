//! Named ranges for `last_year_order_max`

use super::NumericRange;
use crate::error::{PlazasError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Shortcut for an order-max range.
///
/// The `>=` presets end at the highest value observed in the store, so they
/// resolve only when the store holds at least one ranking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OrderPreset {
    /// No preset; the explicit range, if any, applies
    #[default]
    Custom,
    AtLeast6000,
    AtLeast5000,
    AtLeast3000,
    AtLeast1000,
    UpTo1000,
    From1000To3000,
    From3000To5000,
}

impl OrderPreset {
    pub const ALL: [OrderPreset; 8] = [
        OrderPreset::Custom,
        OrderPreset::AtLeast6000,
        OrderPreset::AtLeast5000,
        OrderPreset::AtLeast3000,
        OrderPreset::AtLeast1000,
        OrderPreset::UpTo1000,
        OrderPreset::From1000To3000,
        OrderPreset::From3000To5000,
    ];

    /// Human-facing label, also the serialized form.
    pub const fn label(self) -> &'static str {
        match self {
            OrderPreset::Custom => "Personalizado",
            OrderPreset::AtLeast6000 => ">= 6000",
            OrderPreset::AtLeast5000 => ">= 5000",
            OrderPreset::AtLeast3000 => ">= 3000",
            OrderPreset::AtLeast1000 => ">= 1000",
            OrderPreset::UpTo1000 => "0 - 1000",
            OrderPreset::From1000To3000 => "1000 - 3000",
            OrderPreset::From3000To5000 => "3000 - 5000",
        }
    }

    pub const fn is_custom(self) -> bool {
        matches!(self, OrderPreset::Custom)
    }

    pub const fn requires_observed_max(self) -> bool {
        matches!(
            self,
            OrderPreset::AtLeast6000
                | OrderPreset::AtLeast5000
                | OrderPreset::AtLeast3000
                | OrderPreset::AtLeast1000
        )
    }

    /// Concrete bounds for this preset.
    ///
    /// `Custom` never expands. The `>=` presets need `observed_max`; when the
    /// observed max is below the preset floor the range is empty and matches
    /// nothing.
    pub fn expand(self, observed_max: Option<i64>) -> Option<NumericRange> {
        let at_least = |low: i64| observed_max.map(|high| NumericRange::new(low, high));
        match self {
            OrderPreset::Custom => None,
            OrderPreset::AtLeast6000 => at_least(6000),
            OrderPreset::AtLeast5000 => at_least(5000),
            OrderPreset::AtLeast3000 => at_least(3000),
            OrderPreset::AtLeast1000 => at_least(1000),
            OrderPreset::UpTo1000 => Some(NumericRange::new(0, 1000)),
            OrderPreset::From1000To3000 => Some(NumericRange::new(1000, 3000)),
            OrderPreset::From3000To5000 => Some(NumericRange::new(3000, 5000)),
        }
    }
}

impl fmt::Display for OrderPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn squash(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

impl FromStr for OrderPreset {
    type Err = PlazasError;

    /// Accepts the labels with any spacing and case, plus `custom`.
    fn from_str(s: &str) -> Result<Self> {
        let wanted = squash(s);
        if wanted == "custom" {
            return Ok(OrderPreset::Custom);
        }
        OrderPreset::ALL
            .into_iter()
            .find(|preset| squash(preset.label()) == wanted)
            .ok_or_else(|| {
                let labels: Vec<&str> = OrderPreset::ALL.iter().map(|p| p.label()).collect();
                PlazasError::invalid_argument(format!(
                    "unknown order preset '{}'; expected one of: {}",
                    s,
                    labels.join(", ")
                ))
            })
    }
}

impl Serialize for OrderPreset {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for OrderPreset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}
