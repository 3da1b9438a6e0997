//! Page-number pagination used by list endpoints.

use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Normalised page coordinates.
///
/// - `page_size`: 1..=100, default 10
/// - `page_number`: >= 1, default 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_number: i64,
    pub page_size: i64,
}

impl PageRequest {
    /// Missing or zero page number becomes 1, missing or non-positive size
    /// becomes 10. Sizes above 100 are clamped to 100.
    pub fn new(page_number: Option<i64>, page_size: Option<i64>) -> Self {
        let page_number = match page_number {
            Some(n) if n >= 1 => n,
            _ => 1,
        };
        let page_size = match page_size {
            Some(s) if s > 0 => s.min(MAX_PAGE_SIZE),
            _ => DEFAULT_PAGE_SIZE,
        };
        Self {
            page_number,
            page_size,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page_number - 1).saturating_mul(self.page_size)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_number: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub total_items: i64,
    pub has_next: bool,
    pub next_page: Option<i64>,
    pub has_previous: bool,
    pub previous_page: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_items: i64) -> Self {
        let PageRequest {
            page_number,
            page_size,
        } = request;
        let total_items = total_items.max(0);
        let total_pages = total_items / page_size + i64::from(total_items % page_size != 0);
        let has_next = page_number < total_pages;
        Self {
            items,
            page_number,
            page_size,
            total_pages,
            total_items,
            has_next,
            next_page: has_next.then_some(page_number + 1),
            has_previous: page_number > 1,
            previous_page: (page_number - 1).max(0),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            total_pages: self.total_pages,
            total_items: self.total_items,
            has_next: self.has_next,
            next_page: self.next_page,
            has_previous: self.has_previous,
            previous_page: self.previous_page,
        }
    }
}
