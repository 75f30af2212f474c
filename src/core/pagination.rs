//! Query parameters and pagination utilities

use serde::{Deserialize, Serialize};

/// Page number used when the request carries none or an unusable one
pub const DEFAULT_PAGE: u64 = 1;

/// Page size used when the request carries none or an unusable one
pub const DEFAULT_LIMIT: u64 = 10;

/// Raw pagination parameters as they arrive in the query string
///
/// Values are kept as strings so that `?page=abc` or `?limit=-3` fall back to
/// the defaults instead of rejecting the whole request.
///
/// # Example
/// ```rust,ignore
/// // GET /api/businesses?page=2&limit=5
/// let page = params.resolve(DEFAULT_LIMIT, 100);
/// assert_eq!(page.offset(), 5);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PageParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PageParams {
    /// Coerce into a concrete page, capping the size at `max_limit`
    pub fn resolve(&self, default_limit: u64, max_limit: u64) -> PageRequest {
        let page = positive(self.page.as_deref()).unwrap_or(DEFAULT_PAGE);
        let limit = positive(self.limit.as_deref())
            .unwrap_or(default_limit)
            .clamp(1, max_limit.max(1));
        PageRequest { page, limit }
    }
}

fn positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .map(|n| n as u64)
}

/// A validated page: `page >= 1`, `limit >= 1`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl PageRequest {
    /// Build a page, replacing zero values with the defaults
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: if page == 0 { DEFAULT_PAGE } else { page },
            limit: if limit == 0 { DEFAULT_LIMIT } else { limit },
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Rows to skip: `(page - 1) * limit`
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Metadata for this page given the total count of matching rows
    pub fn meta(&self, total: u64) -> PaginationMeta {
        PaginationMeta::new(self.page, self.limit, total)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_LIMIT)
    }
}

/// Paginated response structure, serialized as `{businesses, pagination}`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Paginated<T> {
    #[serde(rename = "businesses")]
    pub items: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
///
/// Always computed from a separate count over the same predicate, never from
/// the length of the returned page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_count: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    /// Create pagination metadata from calculation
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        // Ensure limit is at least 1 to avoid division by zero
        let limit = limit.max(1);
        let page = page.max(1);

        Self {
            current_page: page,
            total_pages: total.div_ceil(limit),
            total_count: total,
            has_next: page.saturating_mul(limit) < total,
            has_prev: page > 1,
        }
    }
}
