//! Page-number pagination helpers.

use serde::{Deserialize, Serialize};

/// Default page size for list endpoints.
pub const DEFAULT_PER_PAGE: i32 = 50;

/// Maximum page size a client may request.
pub const MAX_PER_PAGE: i32 = 100;

/// Normalized page parameters derived from raw query values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: i32,
    pub per_page: i32,
}

impl PageParams {
    /// Clamps raw `page`/`per_page` query values into valid bounds.
    pub fn from_query(page: Option<i32>, per_page: Option<i32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    /// Row offset for the current page.
    pub fn offset(&self) -> i64 {
        ((self.page - 1) * self.per_page) as i64
    }

    /// Row limit for the current page.
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

/// Pagination metadata attached to list responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Pagination {
    pub page: i32,
    pub per_page: i32,
    pub total: i64,
    pub total_pages: i32,
}

impl Pagination {
    pub fn new(params: PageParams, total: i64) -> Self {
        let total_pages = ((total as f64) / (params.per_page as f64)).ceil() as i32;
        Self {
            page: params.page,
            per_page: params.per_page,
            total,
            total_pages,
        }
    }
}

/// List response envelope used by every paginated endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, params: PageParams, total: i64) -> Self {
        Self {
            data,
            pagination: Pagination::new(params, total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = PageParams::from_query(None, None);
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, DEFAULT_PER_PAGE);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn test_clamping() {
        let params = PageParams::from_query(Some(0), Some(1000));
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, MAX_PER_PAGE);

        let params = PageParams::from_query(Some(-3), Some(0));
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 1);
    }

    #[test]
    fn test_offset() {
        let params = PageParams::from_query(Some(3), Some(25));
        assert_eq!(params.offset(), 50);
        assert_eq!(params.limit(), 25);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let params = PageParams::from_query(Some(1), Some(10));
        assert_eq!(Pagination::new(params, 0).total_pages, 0);
        assert_eq!(Pagination::new(params, 10).total_pages, 1);
        assert_eq!(Pagination::new(params, 11).total_pages, 2);
    }

    #[test]
    fn test_page_envelope_serialization() {
        let params = PageParams::from_query(Some(2), Some(2));
        let page = Page::new(vec!["a", "b"], params, 5);
        let json = serde_json::to_string(&page).unwrap();
        assert!(json.contains("\"data\":[\"a\",\"b\"]"));
        assert!(json.contains("\"total\":5"));
        assert!(json.contains("\"total_pages\":3"));
    }
}
