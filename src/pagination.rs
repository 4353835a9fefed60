//! Pagination metadata and page-link windows for list views.
//!
//! Requests are 1-based throughout. `current_page` echoes whatever the
//! upstream reported for the slice, so widgets should derive links from the
//! request's `page_index` through [`PageLinks::new`], the one place the two
//! numbering schemes meet.

use serde::Serialize;

use crate::domain::page::Page;

/// Counters shown next to a list.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_elements: u64,
    pub page_size: u64,
}

impl PaginationState {
    /// Zeroed counters that keep the requested page size.
    pub fn empty(page_size: u32) -> Self {
        Self {
            page_size: u64::from(page_size),
            ..Self::default()
        }
    }

    pub fn from_page<T>(page: &Page<T>) -> Self {
        Self {
            current_page: page.number,
            total_pages: page.total_pages,
            total_elements: page.total_elements,
            page_size: page.size,
        }
    }
}

fn get_pages(
    total_pages: usize,
    current_page: usize,
    left_edge: usize,
    left_current: usize,
    right_current: usize,
    right_edge: usize,
) -> Vec<Option<usize>> {
    let last_page = total_pages;

    if last_page == 0 {
        return vec![];
    }

    let mut pages = Vec::new();

    let left_end = (1 + left_edge).min(last_page + 1);
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(left_current));
    let mid_end = (current_page + right_current + 1).min(last_page + 1);

    if mid_start > left_end {
        pages.push(None);
    }
    pages.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(last_page.saturating_sub(right_edge) + 1);

    if right_start > mid_end {
        pages.push(None);
    }
    pages.extend((right_start..=last_page).map(Some));

    pages
}

/// 1-based page links with `None` marking a gap.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct PageLinks {
    pub pages: Vec<Option<usize>>,
    pub page: usize,
}

impl PageLinks {
    /// Builds the window around the 1-based `page_index`.
    pub fn new(page_index: u32, total_pages: u64) -> Self {
        let page = (page_index as usize).max(1);
        let total_pages = usize::try_from(total_pages).unwrap_or(usize::MAX);

        Self {
            pages: get_pages(total_pages, page, 2, 2, 4, 2),
            page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_collapses_distant_pages() {
        let links = PageLinks::new(10, 20);

        assert_eq!(links.page, 10);
        assert_eq!(
            links.pages,
            vec![
                Some(1),
                Some(2),
                None,
                Some(8),
                Some(9),
                Some(10),
                Some(11),
                Some(12),
                Some(13),
                Some(14),
                None,
                Some(19),
                Some(20),
            ]
        );
    }

    #[test]
    fn no_pages_no_links() {
        assert!(PageLinks::new(1, 0).pages.is_empty());
        assert_eq!(PageLinks::new(0, 3).page, 1);
    }

    #[test]
    fn state_mirrors_upstream_counters() {
        let page = Page::<u8> {
            content: vec![1],
            total_elements: 31,
            total_pages: 4,
            number: 0,
            size: 10,
        };

        assert_eq!(
            PaginationState::from_page(&page),
            PaginationState {
                current_page: 0,
                total_pages: 4,
                total_elements: 31,
                page_size: 10,
            }
        );
        assert_eq!(PaginationState::empty(12).page_size, 12);
    }
}
