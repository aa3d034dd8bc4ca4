//! Page/limit handling shared by every list operation.

use serde::Serialize;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 50;
pub const MAX_LIMIT: i64 = 100;

/// A validated page request: `page >= 1`, `1 <= limit <= 100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    page: i64,
    limit: i64,
}

impl Page {
    /// Out-of-range values fall back to the defaults rather than failing.
    pub fn new(page: i64, limit: i64) -> Self {
        let page = if page < 1 { DEFAULT_PAGE } else { page };
        let limit = if (1..=MAX_LIMIT).contains(&limit) {
            limit
        } else {
            DEFAULT_LIMIT
        };
        Self { page, limit }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn meta(&self, total: i64) -> PageMeta {
        PageMeta {
            page: self.page,
            limit: self.limit,
            total,
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// The `meta` object of list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
}

/// One page of results plus the total row count.
#[derive(Debug, Clone, PartialEq)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Paged<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paged<U> {
        Paged {
            items: self.items.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 50, 1, 50, 0)]
    #[case(3, 20, 3, 20, 40)]
    #[case(0, 50, 1, 50, 0)]
    #[case(-4, 10, 1, 10, 0)]
    #[case(2, 0, 2, 50, 50)]
    #[case(2, 101, 2, 50, 50)]
    #[case(1, 100, 1, 100, 0)]
    fn test_page_clamping(
        #[case] page: i64,
        #[case] limit: i64,
        #[case] expected_page: i64,
        #[case] expected_limit: i64,
        #[case] expected_offset: i64,
    ) {
        let p = Page::new(page, limit);
        assert_eq!(p.page(), expected_page);
        assert_eq!(p.limit(), expected_limit);
        assert_eq!(p.offset(), expected_offset);
    }

    #[rstest]
    fn test_meta_serializes() {
        let meta = Page::new(2, 10).meta(35);
        assert_eq!(
            serde_json::to_value(meta).unwrap(),
            serde_json::json!({"page": 2, "limit": 10, "total": 35})
        );
    }

    #[rstest]
    fn test_pages_cover_total_exactly_once() {
        let total = 23i64;
        let limit = 5i64;
        let pages = (total + limit - 1) / limit;
        let mut seen = Vec::new();
        for n in 1..=pages {
            let p = Page::new(n, limit);
            let end = (p.offset() + p.limit()).min(total);
            seen.extend(p.offset()..end);
        }
        assert_eq!(seen, (0..total).collect::<Vec<_>>());
    }
}
