//! Student listing query state and the search filter it sends to the backend.

use serde::{Deserialize, Serialize};

use crate::models::{StudentStatus, StudentSummary};

/// Students shown per page unless configured otherwise
pub const DEFAULT_PAGE_SIZE: u32 = 6;

/// Columns searched by the listing, as embedded-resource paths
const SEARCH_COLUMNS: [&str; 2] = ["profile.full_name", "offer.qualification.name"];

/// Characters that must be quoted inside a PostgREST logic filter
const RESERVED_FILTER_CHARS: [char; 5] = [',', '(', ')', ':', '"'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(StudentStatus),
}

impl StatusFilter {
    /// Cycle All -> each filterable status -> All
    pub fn next(self) -> Self {
        let statuses = StudentStatus::FILTERABLE;
        match self {
            StatusFilter::All => StatusFilter::Only(statuses[0]),
            StatusFilter::Only(current) => statuses
                .iter()
                .position(|s| *s == current)
                .and_then(|i| statuses.get(i + 1))
                .map(|s| StatusFilter::Only(*s))
                .unwrap_or(StatusFilter::All),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Only(status) => status.display_name(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchCase {
    #[default]
    Insensitive,
    Sensitive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPosition {
    #[default]
    Contains,
    Prefix,
}

/// How a search term is matched against names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchMatch {
    #[serde(default)]
    pub case: MatchCase,
    #[serde(default)]
    pub position: MatchPosition,
}

impl SearchMatch {
    fn operator(&self) -> &'static str {
        match self.case {
            MatchCase::Insensitive => "ilike",
            MatchCase::Sensitive => "like",
        }
    }

    fn pattern(&self, term: &str) -> String {
        let pattern = match self.position {
            MatchPosition::Contains => format!("*{}*", term),
            MatchPosition::Prefix => format!("{}*", term),
        };
        if term.contains(&RESERVED_FILTER_CHARS[..]) || term.contains('\\') {
            format!("\"{}\"", pattern.replace('\\', "\\\\").replace('"', "\\\""))
        } else {
            pattern
        }
    }
}

/// One page of the listing plus the exact row count across all pages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentPage {
    pub students: Vec<StudentSummary>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudentQuery {
    /// 1-based page number
    pub page: u32,
    pub page_size: u32,
    pub search: String,
    pub status: StatusFilter,
    pub matching: SearchMatch,
}

impl Default for StudentQuery {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, SearchMatch::default())
    }
}

impl StudentQuery {
    pub fn new(page_size: u32, matching: SearchMatch) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            search: String::new(),
            status: StatusFilter::All,
            matching,
        }
    }

    /// Replace the search text; any change returns to the first page.
    pub fn set_search(&mut self, search: impl Into<String>) {
        let search = search.into();
        if search != self.search {
            self.search = search;
            self.page = 1;
        }
    }

    pub fn set_status(&mut self, status: StatusFilter) {
        if status != self.status {
            self.status = status;
            self.page = 1;
        }
    }

    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Inclusive row range for the current page.
    pub fn range(&self) -> (u64, u64) {
        let size = self.page_size.max(1) as u64;
        let from = (self.page.max(1) as u64 - 1) * size;
        (from, from + size - 1)
    }

    /// Trimmed search text, `None` when blank
    pub fn search_term(&self) -> Option<&str> {
        let term = self.search.trim();
        (!term.is_empty()).then_some(term)
    }

    /// PostgREST `or` filter across student and qualification names.
    pub fn search_filter(&self) -> Option<String> {
        let term = self.search_term()?;
        let op = self.matching.operator();
        let pattern = self.matching.pattern(term);
        let clauses: Vec<String> = SEARCH_COLUMNS
            .iter()
            .map(|column| format!("{}.{}.{}", column, op, pattern))
            .collect();
        Some(format!("({})", clauses.join(",")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_for_pages() {
        let mut query = StudentQuery::default();
        assert_eq!(query.range(), (0, 5));
        query.set_page(3);
        assert_eq!(query.range(), (12, 17));
    }

    #[test]
    fn test_search_and_status_reset_page() {
        let mut query = StudentQuery::default();
        query.set_page(4);
        query.set_search("ali");
        assert_eq!(query.page, 1);

        query.set_page(2);
        query.set_search("ali");
        assert_eq!(query.page, 2, "unchanged search keeps the page");

        query.set_status(StatusFilter::Only(StudentStatus::Active));
        assert_eq!(query.page, 1);
    }

    #[test]
    fn test_blank_search_has_no_filter() {
        let mut query = StudentQuery::default();
        query.set_search("   ");
        assert_eq!(query.search_term(), None);
        assert_eq!(query.search_filter(), None);
    }

    #[test]
    fn test_default_search_filter() {
        let mut query = StudentQuery::default();
        query.set_search("  Smith ");
        assert_eq!(
            query.search_filter().as_deref(),
            Some("(profile.full_name.ilike.*Smith*,offer.qualification.name.ilike.*Smith*)")
        );
    }

    #[test]
    fn test_case_sensitive_prefix_filter() {
        let matching = SearchMatch {
            case: MatchCase::Sensitive,
            position: MatchPosition::Prefix,
        };
        let mut query = StudentQuery::new(10, matching);
        query.set_search("Cert");
        assert_eq!(
            query.search_filter().as_deref(),
            Some("(profile.full_name.like.Cert*,offer.qualification.name.like.Cert*)")
        );
    }

    #[test]
    fn test_reserved_characters_are_quoted() {
        let mut query = StudentQuery::default();
        query.set_search("Smith, J");
        let filter = query.search_filter().unwrap_or_default();
        assert!(filter.contains("profile.full_name.ilike.\"*Smith, J*\""));
    }

    #[test]
    fn test_status_filter_cycle() {
        let mut filter = StatusFilter::All;
        let mut seen = Vec::new();
        for _ in 0..5 {
            filter = filter.next();
            seen.push(filter);
        }
        assert_eq!(seen[0], StatusFilter::Only(StudentStatus::Active));
        assert_eq!(seen[4], StatusFilter::All);
        assert_eq!(StatusFilter::All.label(), "All");
    }
}
