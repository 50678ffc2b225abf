//! `plazas values` command implementation

use crate::commands::{blocking, open_store};
use crate::config::Config;
use crate::error::Result;
use plazas_core::Column;

/// List the distinct values of a categorical column, one per line
pub async fn run(config: Config, column: Column) -> Result<()> {
    let values = blocking(move || {
        let store = open_store(&config)?;
        Ok(store.distinct_values(column)?)
    })
    .await?;

    for value in values {
        println!("{value}");
    }
    Ok(())
}
