//! Pagination types for list operations.

use serde::{Deserialize, Serialize};

/// A normalized request for a page of results.
///
/// Pages are 1-indexed. Construct through [`PageRequest::normalized`] so that
/// out-of-range input never reaches the store or the cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    /// The page number (1-indexed).
    pub page: i64,
    /// The number of items per page.
    pub page_size: i64,
}

impl PageRequest {
    /// The first page.
    pub const FIRST_PAGE: i64 = 1;
    /// The default page size.
    pub const DEFAULT_SIZE: i64 = 10;
    /// The maximum allowed page size.
    pub const MAX_SIZE: i64 = 100;

    /// Normalizes raw page parameters.
    ///
    /// A page below 1 becomes 1, a size below 1 becomes the default and a
    /// size above the maximum is clamped.
    #[must_use]
    pub fn normalized(page: i64, page_size: i64) -> Self {
        let page = if page < Self::FIRST_PAGE { Self::FIRST_PAGE } else { page };
        let page_size = if page_size < 1 {
            Self::DEFAULT_SIZE
        } else {
            page_size.min(Self::MAX_SIZE)
        };
        Self { page, page_size }
    }

    /// Returns the offset for database queries.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Returns the limit for database queries.
    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::normalized(Self::FIRST_PAGE, Self::DEFAULT_SIZE)
    }
}

/// A page of results plus the total number of matching items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// The total number of items across all pages.
    pub total_count: i64,
}

impl<T> Page<T> {
    /// Creates a new page.
    #[must_use]
    pub const fn new(items: Vec<T>, total_count: i64) -> Self {
        Self { items, total_count }
    }

    /// Creates an empty page.
    #[must_use]
    pub const fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }

    /// Maps the page content to a different type.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
        }
    }

    /// Returns true if the page is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_defaults() {
        let req = PageRequest::normalized(0, 0);
        assert_eq!(req.page, 1);
        assert_eq!(req.page_size, 10);

        let req = PageRequest::normalized(-3, -1);
        assert_eq!(req, PageRequest { page: 1, page_size: 10 });
    }

    #[test]
    fn test_normalize_keeps_valid_values() {
        let req = PageRequest::normalized(3, 25);
        assert_eq!(req, PageRequest { page: 3, page_size: 25 });
    }

    #[test]
    fn test_normalize_clamps_size() {
        assert_eq!(PageRequest::normalized(1, 10_000).page_size, PageRequest::MAX_SIZE);
    }

    #[test]
    fn test_offset_and_limit() {
        let req = PageRequest::normalized(3, 20);
        assert_eq!(req.offset(), 40);
        assert_eq!(req.limit(), 20);
        assert_eq!(PageRequest::default().offset(), 0);
    }

    #[test]
    fn test_page_map() {
        let page = Page::new(vec![1, 2, 3], 9);
        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.items, vec![10, 20, 30]);
        assert_eq!(mapped.total_count, 9);
        assert_eq!(mapped.len(), 3);
        assert!(Page::<i32>::empty().is_empty());
    }
}
