use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::MAX_PAGE_SIZE;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub meta: Option<Meta>,
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Meta {
    pub total: i64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>, meta: Option<Meta>) -> Self {
        Self {
            success: true,
            data,
            message,
            meta,
            errors: None,
        }
    }

    pub fn error(message: Option<String>, errors: Option<Vec<String>>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message,
            meta: None,
            errors,
        }
    }
}

// =============================================================================
// PAGINATION
// =============================================================================

/// A 1-indexed page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub rows: i64,
}

impl PageRequest {
    pub fn new(page: i64, rows: i64) -> Self {
        Self { page, rows }
    }

    /// Only paginate when both halves are supplied
    pub fn from_parts(page: Option<i64>, rows: Option<i64>) -> Option<Self> {
        match (page, rows) {
            (Some(page), Some(rows)) => Some(Self::new(page, rows)),
            _ => None,
        }
    }

    /// Calculate SQL OFFSET from page number; saturates instead of overflowing
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1).saturating_mul(self.limit())
    }

    /// Get clamped page size (respects MAX_PAGE_SIZE)
    pub fn limit(&self) -> i64 {
        self.rows.clamp(1, MAX_PAGE_SIZE)
    }
}

/// Result of a list call: the selected rows plus the size of the full set
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub total: i64,
}

impl<T> Listing<T> {
    pub fn unpaged(items: Vec<T>) -> Self {
        let total = items.len() as i64;
        Self { items, total }
    }

    pub fn paged(items: Vec<T>, total: i64) -> Self {
        Self { items, total }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_requires_both_parts() {
        assert_eq!(
            PageRequest::from_parts(Some(2), Some(10)),
            Some(PageRequest::new(2, 10))
        );
        assert_eq!(PageRequest::from_parts(Some(2), None), None);
        assert_eq!(PageRequest::from_parts(None, Some(10)), None);
        assert_eq!(PageRequest::from_parts(None, None), None);
    }

    #[test]
    fn test_offset_and_limit() {
        assert_eq!(PageRequest::new(1, 10).offset(), 0);
        assert_eq!(PageRequest::new(2, 10).offset(), 10);
        assert_eq!(PageRequest::new(3, 7).offset(), 14);
        // Non-positive input degrades to the first page of at least one row
        assert_eq!(PageRequest::new(0, 10).offset(), 0);
        assert_eq!(PageRequest::new(-4, 0).limit(), 1);
        assert_eq!(PageRequest::new(1, 500).limit(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_offset_saturates_on_huge_pages() {
        let page = PageRequest::new(i64::MAX, 100);
        assert_eq!(page.offset(), i64::MAX);
        assert!(PageRequest::new(i64::MAX, i64::MAX).offset() >= 0);
    }

    #[test]
    fn test_unpaged_listing_counts_items() {
        let listing = Listing::unpaged(vec![1, 2, 3]);
        assert_eq!(listing.total, 3);
        assert_eq!(listing.items, vec![1, 2, 3]);
    }
}
