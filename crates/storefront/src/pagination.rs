//! Pagination arithmetic and page-link windowing.
//!
//! Pure functions of `(total_count, page_size, current_page)`, kept separate
//! from the query composer so they can be tested without any backend.

use serde::Serialize;

/// Navigation metadata derived from a counted query result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub current_page: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl PageInfo {
    /// Derive navigation metadata.
    ///
    /// `total_count = 0` yields zero pages and both flags false; `page_size`
    /// of zero is treated as one to keep the arithmetic total.
    #[must_use]
    pub fn compute(total_count: u64, page_size: u32, current_page: u32) -> Self {
        let page_size = page_size.max(1);
        let total_pages =
            u32::try_from(total_count.div_ceil(u64::from(page_size))).unwrap_or(u32::MAX);
        Self {
            current_page,
            page_size,
            total_count,
            total_pages,
            has_next_page: current_page < total_pages,
            has_previous_page: current_page > 1,
        }
    }
}

/// One entry in the rendered page-number strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageLink {
    Page { number: u32 },
    Ellipsis,
}

/// Page-number strip for the listing footer.
///
/// Always shows the first and last page; shows one page either side of the
/// current page; any larger gap collapses into a single ellipsis marker.
#[must_use]
pub fn page_links(current_page: u32, total_pages: u32) -> Vec<PageLink> {
    let mut links = Vec::new();
    let mut gap_pending = false;

    for page in 1..=total_pages {
        let shown = page == 1 || page == total_pages || page.abs_diff(current_page) <= 1;
        if shown {
            if gap_pending {
                links.push(PageLink::Ellipsis);
                gap_pending = false;
            }
            links.push(PageLink::Page { number: page });
        } else {
            gap_pending = true;
        }
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(links: &[PageLink]) -> Vec<Option<u32>> {
        links
            .iter()
            .map(|link| match link {
                PageLink::Page { number } => Some(*number),
                PageLink::Ellipsis => None,
            })
            .collect()
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(PageInfo::compute(25, 12, 1).total_pages, 3);
        assert_eq!(PageInfo::compute(24, 12, 1).total_pages, 2);
        assert_eq!(PageInfo::compute(1, 12, 1).total_pages, 1);
    }

    #[test]
    fn test_zero_count_boundary() {
        let info = PageInfo::compute(0, 12, 1);
        assert_eq!(info.total_pages, 0);
        assert!(!info.has_next_page);
        assert!(!info.has_previous_page);
    }

    #[test]
    fn test_navigation_flags() {
        let info = PageInfo::compute(100, 10, 1);
        assert!(info.has_next_page);
        assert!(!info.has_previous_page);

        let info = PageInfo::compute(100, 10, 5);
        assert!(info.has_next_page);
        assert!(info.has_previous_page);

        let info = PageInfo::compute(100, 10, 10);
        assert!(!info.has_next_page);
        assert!(info.has_previous_page);
    }

    #[test]
    fn test_page_past_the_end() {
        let info = PageInfo::compute(5, 12, 4);
        assert_eq!(info.total_pages, 1);
        assert!(!info.has_next_page);
        assert!(info.has_previous_page);
    }

    #[test]
    fn test_links_no_gaps_when_few_pages() {
        assert_eq!(pages(&page_links(1, 1)), vec![Some(1)]);
        assert_eq!(
            pages(&page_links(2, 4)),
            vec![Some(1), Some(2), Some(3), Some(4)]
        );
    }

    #[test]
    fn test_links_collapse_both_gaps() {
        // 1 … 4 5 6 … 10
        assert_eq!(
            pages(&page_links(5, 10)),
            vec![Some(1), None, Some(4), Some(5), Some(6), None, Some(10)]
        );
    }

    #[test]
    fn test_links_at_edges() {
        // 1 2 … 10
        assert_eq!(
            pages(&page_links(1, 10)),
            vec![Some(1), Some(2), None, Some(10)]
        );
        // 1 … 9 10
        assert_eq!(
            pages(&page_links(10, 10)),
            vec![Some(1), None, Some(9), Some(10)]
        );
    }

    #[test]
    fn test_links_adjacent_gap_is_not_collapsed() {
        // Gap of exactly one page still renders as an ellipsis marker:
        // 1 … 3 4 5 … 7  (pages 2 and 6 hidden)
        assert_eq!(
            pages(&page_links(4, 7)),
            vec![Some(1), None, Some(3), Some(4), Some(5), None, Some(7)]
        );
    }

    #[test]
    fn test_links_empty_result_set() {
        assert!(page_links(1, 0).is_empty());
    }
}
