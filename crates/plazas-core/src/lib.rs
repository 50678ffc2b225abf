//! Plazas Core Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Loads the residency placement dataset ("plazas") from CSV into a local
//! SQLite store and answers filtered, paginated queries against it.
//!
//! # Overview
//!
//! - **Validation**: header and integer-column checks with aggregated diagnostics ([`validate`])
//! - **Ingestion**: staleness-aware atomic rebuild of the store ([`ingest`])
//! - **Filters**: structured filter spec to parameterized predicate ([`filter`])
//! - **Queries**: count, page and top-N aggregate ([`query`], [`pagination`])
//! - **Export**: CSV, JSON and XLSX serialization of a page ([`export`])
//!
//! # Example
//!
//! ```no_run
//! use plazas_core::{ensure_store, query_page, FilterSpec, YearFilter};
//! use std::num::NonZeroU32;
//! use std::path::Path;
//!
//! fn main() -> plazas_core::Result<()> {
//!     let source = Path::new("plazas_orden_ultimo_ano.csv");
//!     let store = ensure_store(source, &plazas_core::default_store_path(source))?;
//!
//!     let spec = FilterSpec {
//!         specialties: vec!["CARDIOLOGÍA".to_string()],
//!         year: YearFilter::Exact(2025),
//!         ..Default::default()
//!     };
//!     let page_size = NonZeroU32::new(200).ok_or_else(|| {
//!         plazas_core::PlazasError::invalid_argument("page size must be positive")
//!     })?;
//!     let page = query_page(&store, &spec, page_size, 1)?;
//!     println!("{} rows, {} pages", page.total_count(), page.total_pages());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod export;
pub mod filter;
pub mod ingest;
pub mod pagination;
pub mod query;
pub mod record;
pub mod store;
pub mod validate;

// Re-export commonly used types
pub use error::{PlazasError, Result, RowTypeErrors, RowViolation};
pub use export::ExportFormat;
pub use filter::{FilterSpec, NumericRange, OrderPreset, Predicate, YearFilter};
pub use ingest::{default_store_path, ensure_store, rebuild_store, staleness, Staleness};
pub use pagination::PageInfo;
pub use query::{query_page, query_summary, query_top_n, GroupCount, PageResult, SpecialtyTop};
pub use record::{Column, PlacementRecord};
pub use store::{SourceFingerprint, Store, StoreOrigin};
pub use validate::{validate_csv, ValidationSummary};
