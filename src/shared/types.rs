use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

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

/// One page of a collection listing.
///
/// `total` counts every row matching the filters, independent of `page`.
/// A page past the end carries empty `items` and the same `total`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    /// Number of non-empty pages (`ceil(total / limit)`)
    pub pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, page: i64, limit: i64) -> Self {
        let pages = if limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };
        Self {
            items,
            total,
            page,
            limit,
            pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count_rounds_up() {
        let page: Page<i32> = Page::new(vec![], 21, 3, 10);
        assert_eq!(page.pages, 3);
        assert_eq!(page.total, 21);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_page_count_exact_and_empty() {
        assert_eq!(Page::<i32>::new(vec![], 20, 1, 10).pages, 2);
        assert_eq!(Page::<i32>::new(vec![], 0, 1, 10).pages, 0);
        assert_eq!(Page::<i32>::new(vec![], 1, 1, 100).pages, 1);
    }
}
