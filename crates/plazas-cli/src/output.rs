//! Terminal rendering of pages, aggregates and rankings

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use plazas_core::{Column, GroupCount, PageInfo, PlacementRecord, SpecialtyTop};

/// Placeholder for absent values in human-readable output.
pub const NULL_DISPLAY: &str = "-";

fn display(value: Option<String>) -> String {
    value.unwrap_or_else(|| NULL_DISPLAY.to_string())
}

fn display_ref(value: Option<&str>) -> &str {
    value.unwrap_or(NULL_DISPLAY)
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS);
    table
}

/// Columns shown in the table view; `search_name` and `last_year_orders` stay
/// in the exports only.
const TABLE_COLUMNS: [Column; 8] = [
    Column::Specialty,
    Column::Ccaa,
    Column::Province,
    Column::City,
    Column::Center,
    Column::TotalPlaces,
    Column::LastYear,
    Column::LastYearOrderMax,
];

/// Format a page of rows as a table
pub fn format_records_table(rows: &[PlacementRecord]) -> String {
    let mut table = new_table();
    table.set_header(TABLE_COLUMNS.iter().map(|c| c.as_str()));
    for row in rows {
        table.add_row(TABLE_COLUMNS.iter().map(|c| display(row.value(*c))));
    }
    format!("{table}\n")
}

/// Format group counts as a two-column table
pub fn format_groups_table(column: Column, groups: &[GroupCount]) -> String {
    let mut table = new_table();
    table.set_header(vec![column.as_str(), "count"]);
    for group in groups {
        table.add_row(vec![display(group.value.clone()), group.count.to_string()]);
    }
    format!("{table}\n")
}

/// `total | page x of y | rows on page`
pub fn page_status_line(pagination: &PageInfo, rows_on_page: usize) -> String {
    format!(
        "{} results | page {} of {} | {} rows on page",
        pagination.total_count, pagination.page, pagination.total_pages, rows_on_page
    )
}

/// Indented `value  count` lines
pub fn format_summary_lines(groups: &[GroupCount]) -> String {
    let width = groups
        .iter()
        .map(|g| display_ref(g.value.as_deref()).chars().count())
        .max()
        .unwrap_or(0);
    groups
        .iter()
        .map(|g| {
            let label = display_ref(g.value.as_deref());
            let pad = width - label.chars().count();
            format!("  {label}{}  {}\n", " ".repeat(pad), g.count)
        })
        .collect()
}

/// Plain-text ranking: the specialty name, then one indented line per row
/// (`order | center | city | province | ccaa`) or `(no data)`.
pub fn format_specialty_tops(tops: &[SpecialtyTop]) -> String {
    let mut out = String::new();
    for top in tops {
        out.push_str(&top.specialty);
        out.push('\n');
        if !top.has_data() {
            out.push_str("  (no data)\n");
            continue;
        }
        for row in &top.rows {
            let fields = [
                display(row.value(Column::LastYearOrderMax)),
                display(row.center.clone()),
                display(row.city.clone()),
                display(row.province.clone()),
                display(row.ccaa.clone()),
            ];
            out.push_str("  ");
            out.push_str(&fields.join(" | "));
            out.push('\n');
        }
    }
    out
}
