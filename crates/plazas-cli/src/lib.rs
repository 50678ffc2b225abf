//! Plazas CLI Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Command-line front end for the residency placement store.
//!
//! # Overview
//!
//! - **Validation**: check a source CSV without building anything (`plazas validate`)
//! - **Ingestion**: build or refresh the SQLite store (`plazas ingest`)
//! - **Status**: source and store freshness (`plazas status`)
//! - **Queries**: filtered, paginated listings with a specialty summary (`plazas query`)
//! - **Aggregates**: top-N values of a column (`plazas summary`)
//! - **Rankings**: best placements per specialty for a cycle (`plazas top`)
//! - **Facets**: distinct values of a categorical column (`plazas values`)

pub mod commands;
pub mod config;
pub mod error;
pub mod filter_args;
pub mod output;

// Re-export commonly used types
pub use config::Config;
pub use error::{CliError, Result};
pub use filter_args::FilterArgs;

use clap::{Parser, Subcommand, ValueEnum};
use plazas_core::Column;
use std::path::PathBuf;

/// Plazas - residency placement explorer
#[derive(Parser, Debug)]
#[command(name = "plazas")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Source CSV (default: plazas_orden_ultimo_ano.csv)
    #[arg(long, global = true)]
    pub source: Option<PathBuf>,

    /// Store database (default: plazas.db next to the source)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Configuration file (default: ./plazas.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print the CLI reference as markdown
    #[arg(long, hide = true)]
    pub markdown_help: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check the source CSV header and integer columns
    Validate,

    /// Build the store, or reuse it when it is newer than the source
    Ingest {
        /// Rebuild even if the store is up to date
        #[arg(short, long)]
        force: bool,
    },

    /// Show source and store paths, modification times and freshness
    Status,

    /// List matching placements, one page at a time
    Query {
        #[command(flatten)]
        filters: FilterArgs,

        /// Page number (clamped to the available pages)
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Rows per page (overrides the configured page size)
        #[arg(long)]
        page_size: Option<u32>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Export the page to this file instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip the top-specialties summary
        #[arg(long)]
        no_summary: bool,
    },

    /// Most frequent values of a column among matching placements
    Summary {
        #[command(flatten)]
        filters: FilterArgs,

        /// Column to group by (e.g. specialty, ccaa, city)
        #[arg(short, long, default_value = "specialty")]
        group_by: Column,

        /// Number of groups to show
        #[arg(short, long, default_value_t = plazas_core::query::DEFAULT_SUMMARY_LIMIT)]
        limit: usize,
    },

    /// Best three placements per specialty for one cycle
    Top {
        /// Cycle year
        #[arg(short, long)]
        year: i64,

        /// Specialty name (repeatable; results keep this order)
        #[arg(short, long = "specialty", required = true)]
        specialties: Vec<String>,
    },

    /// Distinct values of a categorical column
    Values {
        /// Column name (specialty, search_name, ccaa, province, city, center)
        column: Column,
    },
}

/// Output format for `plazas query`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
    /// Excel workbook; needs --output or a redirected stdout
    Xlsx,
}

impl OutputFormat {
    /// Export format behind a non-table output format
    pub fn export_format(self) -> Option<plazas_core::ExportFormat> {
        match self {
            OutputFormat::Table => None,
            OutputFormat::Csv => Some(plazas_core::ExportFormat::Csv),
            OutputFormat::Json => Some(plazas_core::ExportFormat::Json),
            OutputFormat::Xlsx => Some(plazas_core::ExportFormat::Xlsx),
        }
    }
}
