//! `plazas top` command implementation
//!
//! Best placements per specialty for one cycle, as plain text. A specialty
//! without ranked rows prints `(no data)`; that is not an error.

use crate::commands::{blocking, open_store};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::format_specialty_tops;
use plazas_core::query::TOP_PER_SPECIALTY;

pub async fn run(config: Config, year: i64, specialties: Vec<String>) -> Result<()> {
    let specialties: Vec<String> = specialties
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if specialties.is_empty() {
        return Err(CliError::invalid_argument(
            "at least one non-empty --specialty is required",
        ));
    }

    let tops = blocking(move || {
        let store = open_store(&config)?;
        Ok(store.top_by_specialty(year, &specialties, TOP_PER_SPECIALTY)?)
    })
    .await?;

    print!("{}", format_specialty_tops(&tops));
    Ok(())
}
