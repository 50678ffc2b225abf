//! `plazas summary` command implementation

use crate::commands::{blocking, open_store};
use crate::config::Config;
use crate::error::Result;
use crate::output::format_groups_table;
use crate::FilterArgs;
use plazas_core::Column;

/// Print the `limit` most frequent values of `group_by`
pub async fn run(config: Config, filters: FilterArgs, group_by: Column, limit: usize) -> Result<()> {
    let spec = filters.to_spec()?;
    let groups = blocking(move || {
        let store = open_store(&config)?;
        Ok(plazas_core::query_top_n(&store, &spec, group_by, limit)?)
    })
    .await?;

    if groups.is_empty() {
        println!("No matching placements.");
        return Ok(());
    }
    print!("{}", format_groups_table(group_by, &groups));
    Ok(())
}
