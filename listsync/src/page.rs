//! Server-reported paging metadata
//!
//! [`PageInfo`] mirrors the pagination block every list response carries.
//! After a successful fetch the server block replaces the local value
//! wholesale; the client only recomputes it locally after an optimistic
//! delete, and even then pages are clamped so `current_page` never exceeds
//! the page count.

use serde::{Deserialize, Serialize};

/// Paging metadata as last reported by the server
///
/// # Example
///
/// ```rust
/// use listsync::page::PageInfo;
///
/// let page = PageInfo {
///     current_page: 3,
///     total_pages: 3,
///     total_count: 21,
///     limit: 10,
/// };
/// assert_eq!(page.clamp_page(99), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Current page, 1-indexed
    pub current_page: u64,
    /// Total number of pages matching the current filters
    pub total_pages: u64,
    /// Total number of entities matching the current filters
    pub total_count: u64,
    /// Page size
    pub limit: u64,
}

impl Default for PageInfo {
    fn default() -> Self {
        Self::new(20)
    }
}

impl PageInfo {
    /// Fresh metadata for an unfetched collection with the given page size
    #[must_use]
    pub fn new(limit: u64) -> Self {
        Self {
            current_page: 1,
            total_pages: 0,
            total_count: 0,
            limit: limit.max(1),
        }
    }

    /// Clamp a requested page into `[1, max(total_pages, 1)]`
    #[must_use]
    pub fn clamp_page(&self, page: u64) -> u64 {
        page.clamp(1, self.total_pages.max(1))
    }

    /// Enforce the local invariants on a server-supplied block
    ///
    /// Servers are trusted for totals, but a zero limit or an out-of-range
    /// current page would break every later computation, so both are
    /// normalized on the way in.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.limit = self.limit.max(1);
        self.current_page = self.clamp_page(self.current_page);
        self
    }

    /// Reconcile the metadata after one entity was removed locally
    ///
    /// Decrements the total count, recomputes the page count, and clamps the
    /// current page. Returns `true` when the clamp moved the current page,
    /// which is the signal that the page just viewed no longer exists and a
    /// refetch is needed.
    pub fn recompute_after_removal(&mut self) -> bool {
        self.total_count = self.total_count.saturating_sub(1);
        self.total_pages = self.total_count.div_ceil(self.limit);
        let clamped = self.clamp_page(self.current_page);
        let moved = clamped != self.current_page;
        self.current_page = clamped;
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_zero_limit() {
        let page = PageInfo::new(0);
        assert_eq!(page.limit, 1);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn test_clamp_page_bounds() {
        let page = PageInfo {
            current_page: 1,
            total_pages: 3,
            total_count: 25,
            limit: 10,
        };
        assert_eq!(page.clamp_page(0), 1);
        assert_eq!(page.clamp_page(2), 2);
        assert_eq!(page.clamp_page(99), 3);
    }

    #[test]
    fn test_clamp_page_empty_collection() {
        let page = PageInfo::new(10);
        assert_eq!(page.clamp_page(5), 1);
    }

    #[test]
    fn test_normalized_enforces_invariants() {
        let page = PageInfo {
            current_page: 9,
            total_pages: 2,
            total_count: 15,
            limit: 0,
        }
        .normalized();
        assert_eq!(page.limit, 1);
        assert_eq!(page.current_page, 2);
    }

    #[test]
    fn test_removal_recomputes_totals() {
        let mut page = PageInfo {
            current_page: 1,
            total_pages: 3,
            total_count: 25,
            limit: 10,
        };
        let moved = page.recompute_after_removal();
        assert!(!moved);
        assert_eq!(page.total_count, 24);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 1);
    }

    #[test]
    fn test_removal_moves_page_when_last_item_on_last_page_goes() {
        // 21 items at 10 per page; viewing page 3 which holds a single item.
        let mut page = PageInfo {
            current_page: 3,
            total_pages: 3,
            total_count: 21,
            limit: 10,
        };
        let moved = page.recompute_after_removal();
        assert!(moved);
        assert_eq!(page.total_count, 20);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.current_page, 2);
    }

    #[test]
    fn test_removal_of_only_item() {
        let mut page = PageInfo {
            current_page: 1,
            total_pages: 1,
            total_count: 1,
            limit: 10,
        };
        let moved = page.recompute_after_removal();
        assert!(!moved);
        assert_eq!(page.total_count, 0);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.current_page, 1);
    }

    #[test]
    fn test_camel_case_wire_format() {
        let page: PageInfo = serde_json::from_value(serde_json::json!({
            "currentPage": 2,
            "totalPages": 5,
            "totalCount": 98,
            "limit": 20
        }))
        .unwrap();
        assert_eq!(page.current_page, 2);
        assert_eq!(page.total_count, 98);
    }
}
