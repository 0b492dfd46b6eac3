/// Rows per page.
pub const PAGE_SIZE: usize = 10;

/// Number of pages needed for `count` items. Never less than one, so an empty
/// result still reads "Page 1 of 1".
pub fn total_pages(count: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    count.div_ceil(page_size).max(1)
}

/// One page of a sequence plus the numbers needed to describe it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageView<'a, T> {
    pub items: &'a [T],
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// Slices out page `page` (1-based). A page past the end yields an empty
/// slice rather than clamping; page 0 is read as page 1.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> PageView<'_, T> {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let total = items.len();
    let start = (page - 1).saturating_mul(page_size).min(total);
    let end = start.saturating_add(page_size).min(total);
    PageView {
        items: &items[start..end],
        page,
        page_size,
        total,
        total_pages: total_pages(total, page_size),
    }
}

impl<T> PageView<'_, T> {
    /// 1-based inclusive display range, `None` when nothing is shown.
    pub fn range(&self) -> Option<(usize, usize)> {
        if self.items.is_empty() {
            return None;
        }
        let start = (self.page - 1) * self.page_size + 1;
        let end = (self.page * self.page_size).min(self.total);
        Some((start, end))
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn summary(&self) -> String {
        match self.range() {
            Some((start, end)) => format!("Showing {start}–{end} of {}", self.total),
            None => format!("Showing 0 of {}", self.total),
        }
    }

    pub fn indicator(&self) -> String {
        format!("Page {} of {}", self.page, self.total_pages)
    }
}

pub fn previous_page(page: usize) -> usize {
    page.saturating_sub(1).max(1)
}

pub fn next_page(page: usize, total_pages: usize) -> usize {
    page.saturating_add(1).min(total_pages.max(1))
}

pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// Page numbers to offer for direct navigation: the first and last pages,
/// and a band around the current one. `None` marks a gap.
pub fn page_window(total_pages: usize, current: usize) -> Vec<Option<usize>> {
    const EDGE: usize = 2;
    const AROUND: usize = 2;

    if total_pages == 0 {
        return vec![];
    }
    let current = clamp_page(current, total_pages);
    let mut pages = Vec::new();

    let left_end = (1 + EDGE).min(total_pages + 1);
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current.saturating_sub(AROUND));
    let mid_end = (current + AROUND + 1).min(total_pages + 1);
    if mid_start > left_end {
        pages.push(None);
    }
    pages.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(total_pages.saturating_sub(EDGE) + 1);
    if right_start > mid_end {
        pages.push(None);
    }
    pages.extend((right_start..=total_pages).map(Some));

    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_has_a_floor_of_one() {
        assert_eq!(total_pages(0, PAGE_SIZE), 1);
        assert_eq!(total_pages(1, PAGE_SIZE), 1);
        assert_eq!(total_pages(10, PAGE_SIZE), 1);
        assert_eq!(total_pages(11, PAGE_SIZE), 2);
        assert_eq!(total_pages(25, PAGE_SIZE), 3);
    }

    #[test]
    fn pages_reassemble_the_input() {
        for len in [0usize, 1, 9, 10, 11, 20, 37] {
            let items: Vec<usize> = (0..len).collect();
            let pages = total_pages(len, PAGE_SIZE);
            let mut rebuilt = Vec::new();
            for page in 1..=pages {
                let view = paginate(&items, page, PAGE_SIZE);
                assert!(view.items.len() <= PAGE_SIZE);
                rebuilt.extend_from_slice(view.items);
            }
            assert_eq!(rebuilt, items, "len {len}");
        }
    }

    #[test]
    fn out_of_range_page_is_empty_not_a_panic() {
        let items: Vec<u8> = (0..11).collect();
        let view = paginate(&items, 7, PAGE_SIZE);
        assert!(view.items.is_empty());
        assert_eq!(view.range(), None);
        assert_eq!(paginate(&items, usize::MAX, PAGE_SIZE).items.len(), 0);
        assert_eq!(paginate(&items, 0, PAGE_SIZE).page, 1);
    }

    #[test]
    fn display_range_and_labels() {
        let items: Vec<u8> = (0..11).collect();
        let first = paginate(&items, 1, PAGE_SIZE);
        assert_eq!(first.range(), Some((1, 10)));
        assert_eq!(first.summary(), "Showing 1–10 of 11");
        assert_eq!(first.indicator(), "Page 1 of 2");
        assert!(!first.has_previous());
        assert!(first.has_next());

        let second = paginate(&items, 2, PAGE_SIZE);
        assert_eq!(second.range(), Some((11, 11)));
        assert!(second.has_previous());
        assert!(!second.has_next());
    }

    #[test]
    fn empty_result_does_not_read_one_to_zero() {
        let items: Vec<u8> = Vec::new();
        let view = paginate(&items, 1, PAGE_SIZE);
        assert_eq!(view.summary(), "Showing 0 of 0");
        assert_eq!(view.indicator(), "Page 1 of 1");
        assert!(!view.has_previous());
        assert!(!view.has_next());
    }

    #[test]
    fn navigation_stops_at_the_boundaries() {
        assert_eq!(previous_page(1), 1);
        assert_eq!(previous_page(3), 2);
        assert_eq!(next_page(2, 2), 2);
        assert_eq!(next_page(1, 2), 2);
        assert_eq!(next_page(1, 0), 1);
        assert_eq!(clamp_page(0, 3), 1);
        assert_eq!(clamp_page(9, 3), 3);
    }

    #[test]
    fn page_window_collapses_long_ranges() {
        assert_eq!(page_window(0, 1), vec![]);
        assert_eq!(page_window(1, 1), vec![Some(1)]);
        assert_eq!(
            page_window(5, 3),
            vec![Some(1), Some(2), Some(3), Some(4), Some(5)]
        );
        assert_eq!(
            page_window(20, 10),
            vec![
                Some(1),
                Some(2),
                None,
                Some(8),
                Some(9),
                Some(10),
                Some(11),
                Some(12),
                None,
                Some(19),
                Some(20)
            ]
        );
    }
}
