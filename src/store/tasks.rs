use crate::core::visibility::Visibility;
use crate::core::{NewTask, Task, TaskPatch};
use crate::error::{Error, Result};
use crate::query::TaskQuery;

use super::postgrest::{task_query_params, PostgrestClient};
use super::TaskPage;

const TABLE: &str = "tasks";

/// Columns the list view needs; result/comments stay behind until a task is
/// opened.
const SUMMARY_COLUMNS: &str =
    "id,title,client,due_date,status,assigner_telegram_id,assignee_telegram_id,description";

/// Fetch one page of tasks matching `query`, newest deadline last, together
/// with the exact count of everything the filters admit.
pub async fn fetch_page(client: &PostgrestClient, query: &TaskQuery) -> Result<TaskPage> {
    if query.visibility == Visibility::Nothing {
        // No chat id and no subordinates: nothing can match, skip the trip.
        log::debug!("visibility admits no tasks; returning empty page");
        return Ok(TaskPage::default());
    }

    let mut params = vec![("select".to_string(), SUMMARY_COLUMNS.to_string())];
    params.extend(task_query_params(query));

    let (tasks, total) = client
        .select_range(TABLE, &params, query.row_window())
        .await?;
    log::debug!(
        "fetched page {} ({} rows of {} total)",
        query.page,
        tasks.len(),
        total
    );
    Ok(TaskPage { tasks, total })
}

/// Fetch a single task with every column, for the detail/edit view.
pub async fn fetch_by_id(client: &PostgrestClient, id: i64) -> Result<Task> {
    let params = vec![("id".to_string(), format!("eq.{}", id))];
    let mut rows: Vec<Task> = client.select(TABLE, &params).await?;
    rows.pop()
        .ok_or_else(|| Error::store(format!("task {} not found", id)))
}

pub async fn create(client: &PostgrestClient, new_task: &NewTask) -> Result<Task> {
    let task: Task = client.insert(TABLE, new_task).await?;
    log::info!("created task {} '{}'", task.id, task.title);
    Ok(task)
}

pub async fn update(client: &PostgrestClient, id: i64, patch: &TaskPatch) -> Result<Task> {
    if patch.is_empty() {
        return Err(Error::validation("nothing to update"));
    }
    let params = vec![("id".to_string(), format!("eq.{}", id))];
    let task: Task = client.update(TABLE, &params, patch).await?;
    log::info!("updated task {}", task.id);
    Ok(task)
}
