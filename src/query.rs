use chrono::{NaiveDate, NaiveDateTime};

use crate::core::Visibility;

/// Fixed page size for task listings.
pub const PAGE_SIZE: u64 = 20;

/// A composed task-list query: free-text and date-range filters AND-combined
/// with the visibility predicate, ordered ascending by due date, windowed to
/// one page. The store layer renders it; this type never builds query
/// strings itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQuery {
    pub title_contains: Option<String>,
    pub client_contains: Option<String>,
    pub due_from: Option<NaiveDate>,
    pub due_to: Option<NaiveDate>,
    pub visibility: Visibility,
    /// 1-based page number.
    pub page: u64,
}

impl TaskQuery {
    pub fn new(visibility: Visibility) -> Self {
        Self {
            title_contains: None,
            client_contains: None,
            due_from: None,
            due_to: None,
            visibility,
            page: 1,
        }
    }

    /// Case-insensitive substring filter on the title. Empty input clears it.
    pub fn with_title(mut self, substring: &str) -> Self {
        self.title_contains = non_empty(substring);
        self
    }

    /// Case-insensitive substring filter on the client. Empty input clears it.
    pub fn with_client(mut self, substring: &str) -> Self {
        self.client_contains = non_empty(substring);
        self
    }

    pub fn with_due_from(mut self, from: Option<NaiveDate>) -> Self {
        self.due_from = from;
        self
    }

    pub fn with_due_to(mut self, to: Option<NaiveDate>) -> Self {
        self.due_to = to;
        self
    }

    pub fn with_page(mut self, page: u64) -> Self {
        self.page = page.max(1);
        self
    }

    /// Inclusive lower bound: start of the `from` day.
    pub fn due_lower_bound(&self) -> Option<NaiveDateTime> {
        self.due_from.and_then(|d| d.and_hms_opt(0, 0, 0))
    }

    /// Inclusive upper bound: end of the `to` day, so the whole day counts.
    pub fn due_upper_bound(&self) -> Option<NaiveDateTime> {
        self.due_to.and_then(|d| d.and_hms_opt(23, 59, 59))
    }

    /// Zero-based inclusive row window for the current page.
    pub fn row_window(&self) -> (u64, u64) {
        let first = (self.page - 1) * PAGE_SIZE;
        (first, first + PAGE_SIZE - 1)
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
