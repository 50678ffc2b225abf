//! Pagination arithmetic
//!
//! Pages are 1-indexed. The page count is `ceil(total / page_size)` but never
//! less than 1, so an empty result still has a single (empty) page.
//!
//! # Examples
//!
//! ```rust
//! use plazas_core::pagination::{total_pages, PageInfo};
//! use std::num::NonZeroU32;
//!
//! let size = NonZeroU32::new(200).unwrap();
//! assert_eq!(total_pages(0, size), 1);
//! assert_eq!(total_pages(401, size), 3);
//!
//! let info = PageInfo::new(2, size, 401);
//! assert!(info.has_next && info.has_prev);
//! ```

use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// Number of pages for `total` rows, floored at 1.
pub fn total_pages(total: u64, page_size: NonZeroU32) -> u64 {
    total.div_ceil(u64::from(page_size.get())).max(1)
}

/// Row offset of `page`, `None` for page 0 (no rows).
pub fn page_offset(page: u32, page_size: NonZeroU32) -> Option<u64> {
    let index = page.checked_sub(1)?;
    Some(u64::from(index) * u64::from(page_size.get()))
}

/// Bring `page` into `1..=total_pages`.
pub fn clamp_page(page: u32, total_pages: u64) -> u32 {
    let last = u32::try_from(total_pages).unwrap_or(u32::MAX).max(1);
    page.clamp(1, last)
}

/// Pagination metadata for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Requested page number (1-indexed)
    pub page: u32,

    /// Rows per page
    pub page_size: u32,

    /// Rows matching the filter across all pages
    pub total_count: u64,

    /// Number of pages, at least 1
    pub total_pages: u64,

    pub has_next: bool,

    pub has_prev: bool,
}

impl PageInfo {
    pub fn new(page: u32, page_size: NonZeroU32, total_count: u64) -> Self {
        let pages = total_pages(total_count, page_size);
        Self {
            page,
            page_size: page_size.get(),
            total_count,
            total_pages: pages,
            has_next: u64::from(page) < pages,
            has_prev: page > 1,
        }
    }

    /// Whether the page lies inside `1..=total_pages`.
    pub fn in_range(&self) -> bool {
        self.page >= 1 && u64::from(self.page) <= self.total_pages
    }
}
