// ABOUTME: Pagination utilities for list endpoints
// ABOUTME: Provides standardized query parameters and response wrappers

use serde::{Deserialize, Serialize};

/// Default page size for paginated queries
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size to prevent performance issues
pub const MAX_PAGE_SIZE: i64 = 100;

/// Query parameters for pagination. Pages are 0-indexed.
#[derive(Debug, Clone, Deserialize)]
pub struct PageRequest {
    /// Page number (0-indexed, defaults to 0)
    #[serde(default)]
    pub page: i64,

    /// Number of items per page (defaults to DEFAULT_PAGE_SIZE, max MAX_PAGE_SIZE)
    #[serde(default = "default_size")]
    pub size: i64,
}

fn default_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl PageRequest {
    pub fn new(page: i64, size: i64) -> Self {
        Self { page, size }
    }

    /// Validate and normalize pagination parameters
    /// Returns (limit, offset) suitable for SQL queries
    pub fn validate(&self) -> (i64, i64) {
        let page = self.page.max(0);
        let limit = self.size.clamp(1, MAX_PAGE_SIZE);
        let offset = page * limit;

        (limit, offset)
    }

    /// Get SQL LIMIT clause value
    pub fn limit(&self) -> i64 {
        self.validate().0
    }

    /// Get SQL OFFSET clause value
    pub fn offset(&self) -> i64 {
        self.validate().1
    }

    /// Get the current page number
    pub fn page(&self) -> i64 {
        self.page.max(0)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

/// Metadata about pagination state
#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    /// Current page number (0-indexed)
    pub page: i64,

    /// Items per page
    #[serde(rename = "pageSize")]
    pub page_size: i64,

    /// Total number of items across all pages
    #[serde(rename = "totalItems")]
    pub total_items: i64,

    /// Total number of pages
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

impl PaginationMeta {
    /// Create pagination metadata from params and total count
    pub fn new(params: &PageRequest, total_items: i64) -> Self {
        let page = params.page();
        let page_size = params.limit();
        let total_pages = if page_size > 0 {
            (total_items + page_size - 1) / page_size
        } else {
            0
        };

        Self {
            page,
            page_size,
            total_items,
            total_pages,
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    /// The data items for the current page
    pub data: Vec<T>,

    /// Pagination metadata
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, params: &PageRequest, total_items: i64) -> Self {
        Self {
            data,
            pagination: PaginationMeta::new(params, total_items),
        }
    }
}
