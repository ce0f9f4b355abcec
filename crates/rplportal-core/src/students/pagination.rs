//! Page arithmetic for the student listing.

/// Most page numbers shown at once in the pager
pub const MAX_PAGE_BUTTONS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

/// Number of pages needed for `total` rows.
pub fn total_pages(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size as u64).min(u32::MAX as u64) as u32
}

/// Keep a requested page inside `1..=max(total_pages, 1)`.
pub fn clamp_page(page: u32, total_pages: u32) -> u32 {
    page.min(total_pages.max(1)).max(1)
}

/// Pager layout: a sliding window of up to five pages around `current`,
/// with the first/last page and ellipses when the window doesn't reach them.
pub fn page_window(current: u32, total_pages: u32) -> Vec<PageItem> {
    if total_pages == 0 {
        return Vec::new();
    }

    let half = MAX_PAGE_BUTTONS / 2;
    let mut start = current.saturating_sub(half).max(1);
    let mut end = (current + half).min(total_pages);
    if current <= half {
        end = total_pages.min(MAX_PAGE_BUTTONS);
    }
    if current + half >= total_pages {
        start = (total_pages + 1).saturating_sub(MAX_PAGE_BUTTONS).max(1);
    }

    let mut items = Vec::new();
    if start > 1 {
        items.push(PageItem::Page(1));
        if start > 2 {
            items.push(PageItem::Ellipsis);
        }
    }
    items.extend((start..=end).map(PageItem::Page));
    if end < total_pages {
        if end < total_pages - 1 {
            items.push(PageItem::Ellipsis);
        }
        items.push(PageItem::Page(total_pages));
    }
    items
}
