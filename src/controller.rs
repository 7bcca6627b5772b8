use chrono::NaiveDate;

use crate::core::{Task, Visibility};
use crate::error::Error;
use crate::query::{TaskQuery, PAGE_SIZE};
use crate::store::TaskPage;

/// Where the task list currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Error(String),
}

/// Free-text and date-range inputs as the user typed them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilters {
    pub title: String,
    pub client: String,
    pub due_from: Option<NaiveDate>,
    pub due_to: Option<NaiveDate>,
}

/// A fetch the caller must run against the store. The generation ties the
/// eventual response back to the state that requested it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: u64,
    pub query: TaskQuery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// A superseded fetch completed late; its result was dropped.
    Stale,
}

/// Owns pagination, filter state, and the current result page. Sans-IO: it
/// hands out `FetchRequest`s and consumes their results, so completions that
/// arrive out of order can never overwrite newer state.
#[derive(Debug, Clone)]
pub struct TaskListController {
    filters: TaskFilters,
    visibility: Visibility,
    page: u64,
    generation: u64,
    state: ListState,
    rows: Vec<Task>,
    total: u64,
}

impl TaskListController {
    pub fn new(visibility: Visibility) -> Self {
        Self {
            filters: TaskFilters::default(),
            visibility,
            page: 1,
            generation: 0,
            state: ListState::Idle,
            rows: Vec::new(),
            total: 0,
        }
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn rows(&self) -> &[Task] {
        &self.rows
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn filters(&self) -> &TaskFilters {
        &self.filters
    }

    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(PAGE_SIZE).max(1)
    }

    /// Starts a fetch for the current filters/page/visibility. Any fetch
    /// still in flight is superseded by the bumped generation.
    pub fn begin_fetch(&mut self) -> FetchRequest {
        self.generation += 1;
        self.state = ListState::Loading;
        FetchRequest {
            generation: self.generation,
            query: self.build_query(),
        }
    }

    /// Re-runs the current page, e.g. after a successful mutation.
    pub fn refresh(&mut self) -> FetchRequest {
        self.begin_fetch()
    }

    pub fn set_title_filter(&mut self, title: &str) -> FetchRequest {
        self.filters.title = title.to_string();
        self.reset_to_first_page()
    }

    pub fn set_client_filter(&mut self, client: &str) -> FetchRequest {
        self.filters.client = client.to_string();
        self.reset_to_first_page()
    }

    pub fn set_due_from(&mut self, from: Option<NaiveDate>) -> FetchRequest {
        self.filters.due_from = from;
        self.reset_to_first_page()
    }

    pub fn set_due_to(&mut self, to: Option<NaiveDate>) -> FetchRequest {
        self.filters.due_to = to;
        self.reset_to_first_page()
    }

    /// Installs a new visibility predicate (sign-in resolved, sign-out).
    /// Resets to page 1 and supersedes anything in flight.
    pub fn set_visibility(&mut self, visibility: Visibility) -> FetchRequest {
        self.visibility = visibility;
        self.reset_to_first_page()
    }

    pub fn next_page(&mut self) -> Option<FetchRequest> {
        if self.page >= self.total_pages() {
            return None;
        }
        self.page += 1;
        Some(self.begin_fetch())
    }

    pub fn prev_page(&mut self) -> Option<FetchRequest> {
        if self.page <= 1 {
            return None;
        }
        self.page -= 1;
        Some(self.begin_fetch())
    }

    /// Jumps to `page`, clamped to the reachable range.
    pub fn goto_page(&mut self, page: u64) -> FetchRequest {
        self.page = page.clamp(1, self.total_pages());
        self.begin_fetch()
    }

    /// Lands a fetch result. Rows and total update together or not at all;
    /// a failed fetch leaves the previous page on display.
    pub fn apply_result(
        &mut self,
        generation: u64,
        result: Result<TaskPage, Error>,
    ) -> ApplyOutcome {
        if generation != self.generation {
            log::debug!(
                "discarding stale fetch result (generation {} < {})",
                generation,
                self.generation
            );
            return ApplyOutcome::Stale;
        }
        match result {
            Ok(page) => {
                self.rows = page.tasks;
                self.total = page.total;
                self.state = ListState::Loaded;
            }
            Err(e) => {
                log::error!("task list fetch failed: {}", e);
                self.state = ListState::Error(e.to_string());
            }
        }
        ApplyOutcome::Applied
    }

    fn reset_to_first_page(&mut self) -> FetchRequest {
        self.page = 1;
        self.begin_fetch()
    }

    fn build_query(&self) -> TaskQuery {
        TaskQuery::new(self.visibility.clone())
            .with_title(&self.filters.title)
            .with_client(&self.filters.client)
            .with_due_from(self.filters.due_from)
            .with_due_to(self.filters.due_to)
            .with_page(self.page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{TaskCondition, TaskStatus};
    use chrono::NaiveDate;

    fn task(id: i64) -> Task {
        Task {
            id,
            title: format!("task {id}"),
            client: None,
            due_date: NaiveDate::from_ymd_opt(2026, 3, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            description: None,
            result: None,
            status: TaskStatus::InProgress,
            assigner_telegram_id: 1,
            assignee_telegram_id: None,
            comments: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn page_of(ids: &[i64], total: u64) -> TaskPage {
        TaskPage {
            tasks: ids.iter().copied().map(task).collect(),
            total,
        }
    }

    #[test]
    fn fetch_loads_rows_and_total_together() {
        let mut controller = TaskListController::new(Visibility::Unrestricted);
        let request = controller.begin_fetch();
        assert_eq!(*controller.state(), ListState::Loading);

        let outcome = controller.apply_result(request.generation, Ok(page_of(&[1, 2], 42)));
        assert_eq!(outcome, ApplyOutcome::Applied);
        assert_eq!(*controller.state(), ListState::Loaded);
        assert_eq!(controller.rows().len(), 2);
        assert_eq!(controller.total(), 42);
        assert_eq!(controller.total_pages(), 3);
    }

    #[test]
    fn stale_generation_is_discarded() {
        let mut controller = TaskListController::new(Visibility::Unrestricted);
        let first = controller.begin_fetch();
        let second = controller.set_title_filter("report");

        // The superseded fetch completes late; nothing changes.
        let outcome = controller.apply_result(first.generation, Ok(page_of(&[9], 1)));
        assert_eq!(outcome, ApplyOutcome::Stale);
        assert_eq!(*controller.state(), ListState::Loading);
        assert!(controller.rows().is_empty());

        controller
            .apply_result(second.generation, Ok(page_of(&[1], 1)));
        assert_eq!(controller.rows()[0].id, 1);
    }

    #[test]
    fn error_keeps_prior_rows_on_display() {
        let mut controller = TaskListController::new(Visibility::Unrestricted);
        let request = controller.begin_fetch();
        controller.apply_result(request.generation, Ok(page_of(&[1, 2, 3], 3)));

        let retry = controller.refresh();
        controller.apply_result(
            retry.generation,
            Err(Error::store("connection reset by peer")),
        );
        assert!(matches!(controller.state(), ListState::Error(msg) if msg.contains("connection reset")));
        assert_eq!(controller.rows().len(), 3);
        assert_eq!(controller.total(), 3);
    }

    #[test]
    fn filter_change_resets_page_to_one() {
        let mut controller = TaskListController::new(Visibility::Unrestricted);
        let request = controller.begin_fetch();
        controller.apply_result(request.generation, Ok(page_of(&[1], 100)));

        controller.next_page();
        assert_eq!(controller.page(), 2);

        let request = controller.set_client_filter("acme");
        assert_eq!(controller.page(), 1);
        assert_eq!(request.query.client_contains.as_deref(), Some("acme"));
        assert_eq!(request.query.row_window(), (0, 19));
    }

    #[test]
    fn navigation_is_clamped_to_reachable_pages() {
        let mut controller = TaskListController::new(Visibility::Unrestricted);
        assert!(controller.prev_page().is_none());
        // Nothing loaded yet: a single page is assumed.
        assert!(controller.next_page().is_none());

        let request = controller.begin_fetch();
        controller.apply_result(request.generation, Ok(page_of(&[1], 45)));
        assert_eq!(controller.total_pages(), 3);

        controller.goto_page(99);
        assert_eq!(controller.page(), 3);
        assert!(controller.next_page().is_none());

        controller.goto_page(0);
        assert_eq!(controller.page(), 1);
    }

    #[test]
    fn visibility_change_resets_and_supersedes() {
        let mut controller = TaskListController::new(Visibility::Unrestricted);
        let request = controller.begin_fetch();
        controller.apply_result(request.generation, Ok(page_of(&[1], 60)));
        controller.next_page();

        let narrowed = controller.set_visibility(Visibility::AnyOf(vec![
            TaskCondition::AssignerIs(100),
            TaskCondition::AssigneeIs(100),
        ]));
        assert_eq!(controller.page(), 1);
        assert!(matches!(narrowed.query.visibility, Visibility::AnyOf(_)));
    }

    #[test]
    fn empty_result_still_reports_one_page() {
        let mut controller = TaskListController::new(Visibility::Nothing);
        let request = controller.begin_fetch();
        controller.apply_result(request.generation, Ok(page_of(&[], 0)));
        assert_eq!(controller.total_pages(), 1);
        assert_eq!(controller.page(), 1);
    }
}
