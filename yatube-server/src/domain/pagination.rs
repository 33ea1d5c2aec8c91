//! Page-number pagination over an ordered result set.
//!
//! Requested page numbers never produce an error: anything that is not an
//! integer resolves to the first page and out-of-range integers are clamped to
//! the nearest existing page. An empty result set still has one (empty) page.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Paginator {
    per_page: u32,
}

/// A resolved page position: which page to show and the row window for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageWindow {
    pub(crate) number: u32,
    pub(crate) num_pages: u32,
    pub(crate) per_page: u32,
    pub(crate) count: i64,
}

impl PageWindow {
    pub(crate) fn offset(&self) -> i64 {
        i64::from(self.number - 1) * i64::from(self.per_page)
    }
}

impl Paginator {
    pub(crate) fn new(per_page: u32) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    pub(crate) fn per_page(&self) -> u32 {
        self.per_page
    }

    pub(crate) fn num_pages(&self, count: i64) -> u32 {
        if count <= 0 {
            return 1;
        }
        let per_page = i64::from(self.per_page);
        let pages = (count + per_page - 1) / per_page;
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Resolves a raw `?page=` value against a result set of `count` rows.
    pub(crate) fn resolve(&self, raw_page: Option<&str>, count: i64) -> PageWindow {
        let num_pages = self.num_pages(count);
        let number = match raw_page.map(str::trim).and_then(|raw| raw.parse::<i64>().ok()) {
            Some(requested) => requested.clamp(1, i64::from(num_pages)) as u32,
            None => 1,
        };

        PageWindow {
            number,
            num_pages,
            per_page: self.per_page,
            count: count.max(0),
        }
    }
}

/// A bounded, ordered slice of a larger result set plus navigation metadata.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct Page<T> {
    pub(crate) object_list: Vec<T>,
    pub(crate) number: u32,
    pub(crate) num_pages: u32,
    pub(crate) count: i64,
    pub(crate) has_previous: bool,
    pub(crate) has_next: bool,
    pub(crate) previous_page_number: u32,
    pub(crate) next_page_number: u32,
}

impl<T> Page<T> {
    pub(crate) fn new(window: PageWindow, object_list: Vec<T>) -> Self {
        let has_previous = window.number > 1;
        let has_next = window.number < window.num_pages;
        Self {
            object_list,
            number: window.number,
            num_pages: window.num_pages,
            count: window.count,
            has_previous,
            has_next,
            previous_page_number: if has_previous { window.number - 1 } else { 1 },
            next_page_number: if has_next {
                window.number + 1
            } else {
                window.num_pages
            },
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.object_list.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.object_list.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Page, Paginator};

    #[test]
    fn empty_result_set_has_one_page() {
        let paginator = Paginator::new(10);
        let window = paginator.resolve(Some("3"), 0);
        assert_eq!(window.number, 1);
        assert_eq!(window.num_pages, 1);
        assert_eq!(window.offset(), 0);

        let page: Page<i32> = Page::new(window, Vec::new());
        assert!(page.is_empty());
        assert!(!page.has_next);
        assert!(!page.has_previous);
    }

    #[test]
    fn page_count_rounds_up() {
        let paginator = Paginator::new(10);
        assert_eq!(paginator.num_pages(10), 1);
        assert_eq!(paginator.num_pages(11), 2);
        assert_eq!(paginator.num_pages(13), 2);
    }

    #[test]
    fn non_integer_page_resolves_to_first() {
        let paginator = Paginator::new(10);
        for raw in [None, Some(""), Some("abc"), Some("2.5")] {
            assert_eq!(paginator.resolve(raw, 25).number, 1, "raw = {raw:?}");
        }
    }

    #[test]
    fn out_of_range_page_is_clamped() {
        let paginator = Paginator::new(10);
        assert_eq!(paginator.resolve(Some("0"), 25).number, 1);
        assert_eq!(paginator.resolve(Some("-4"), 25).number, 1);
        assert_eq!(paginator.resolve(Some("999"), 25).number, 3);
        assert_eq!(
            paginator.resolve(Some("99999999999999999999"), 25).number,
            1
        );
    }

    #[test]
    fn last_page_window_and_navigation() {
        let paginator = Paginator::new(10);
        let window = paginator.resolve(Some("2"), 13);
        assert_eq!(window.offset(), 10);

        let page = Page::new(window, vec![1, 2, 3]);
        assert_eq!(page.len(), 3);
        assert!(page.has_previous);
        assert!(!page.has_next);
        assert_eq!(page.previous_page_number, 1);
        assert_eq!(page.count, 13);
    }

    #[test]
    fn zero_page_size_is_treated_as_one() {
        let paginator = Paginator::new(0);
        assert_eq!(paginator.per_page(), 1);
        assert_eq!(paginator.num_pages(3), 3);
    }
}
