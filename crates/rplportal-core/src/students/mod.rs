//! Portfolio-team student listing: query state, search filters and paging.

pub mod pagination;
pub mod query;

pub use pagination::{clamp_page, page_window, total_pages, PageItem, MAX_PAGE_BUTTONS};
pub use query::{
    MatchCase, MatchPosition, SearchMatch, StatusFilter, StudentPage, StudentQuery,
    DEFAULT_PAGE_SIZE,
};
