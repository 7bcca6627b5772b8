use chrono::NaiveDateTime;

use crate::core::{NewTask, Task, TaskPatch, TaskStatus};
use crate::error::{Error, Result};
use crate::session::SessionContext;

/// Due dates are typed as `2026-03-01 18:00`, 24-hour clock.
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Buffered create/edit inputs as the user typed them. Nothing reaches the
/// store until `to_new_task` / `to_patch` validates.
#[derive(Debug, Clone)]
pub struct TaskForm {
    /// Id of the task being edited; `None` while creating.
    pub editing: Option<i64>,
    pub title: String,
    pub client: String,
    pub due_date: String,
    pub description: String,
    pub assignee: Option<i64>,
    pub status: TaskStatus,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            editing: None,
            title: String::new(),
            client: String::new(),
            due_date: String::new(),
            description: String::new(),
            assignee: None,
            status: TaskStatus::InProgress,
        }
    }
}

impl TaskForm {
    pub fn from_task(task: &Task) -> Self {
        Self {
            editing: Some(task.id),
            title: task.title.clone(),
            client: task.client.clone().unwrap_or_default(),
            due_date: task.due_date.format(DUE_DATE_FORMAT).to_string(),
            description: task.description.clone().unwrap_or_default(),
            assignee: task.assignee_telegram_id,
            status: task.status,
        }
    }

    /// Builds the insert payload for a new task. The assigner is the
    /// signed-in profile's chat id; status is forced to the default and
    /// comments start unset, whatever the form held.
    pub fn to_new_task(&self, session: &SessionContext) -> Result<NewTask> {
        let (title, due_date) = self.validate()?;
        let assigner = session
            .current()
            .and_then(|p| p.telegram_id)
            .ok_or_else(|| Error::validation("your profile has no chat id; tasks cannot be assigned from it"))?;
        Ok(NewTask {
            title,
            client: optional(&self.client),
            due_date,
            description: optional(&self.description),
            status: TaskStatus::default(),
            assigner_telegram_id: assigner,
            assignee_telegram_id: self.assignee,
        })
    }

    /// Builds the update payload for the task being edited. The assigner is
    /// immutable and never part of the patch.
    pub fn to_patch(&self) -> Result<(i64, TaskPatch)> {
        let id = self
            .editing
            .ok_or_else(|| Error::validation("no task selected for editing"))?;
        let (title, due_date) = self.validate()?;
        let patch = TaskPatch {
            title: Some(title),
            client: Some(optional(&self.client)),
            due_date: Some(due_date),
            description: Some(optional(&self.description)),
            assignee_telegram_id: Some(self.assignee),
            status: Some(self.status),
            ..TaskPatch::default()
        };
        Ok((id, patch))
    }

    fn validate(&self) -> Result<(String, NaiveDateTime)> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(Error::validation("title is required"));
        }
        let due = self.due_date.trim();
        if due.is_empty() {
            return Err(Error::validation("due date is required"));
        }
        let due_date = NaiveDateTime::parse_from_str(due, DUE_DATE_FORMAT).map_err(|_| {
            Error::validation("due date must be YYYY-MM-DD HH:MM, e.g. 2026-03-01 18:00")
        })?;
        Ok((title.to_string(), due_date))
    }
}

/// Patch attaching a result to a task: the assignee hands work back, which
/// puts the task under review and stamps the update time.
pub fn result_submission(result_text: &str, now: NaiveDateTime) -> Result<TaskPatch> {
    let text = result_text.trim();
    if text.is_empty() {
        return Err(Error::validation("result text is required"));
    }
    Ok(TaskPatch {
        result: Some(text.to_string()),
        status: Some(TaskStatus::PendingReview),
        updated_at: Some(now),
        ..TaskPatch::default()
    })
}

/// Empty input and the bot's "no value" dash both mean absent.
fn optional(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed == "-" {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Profile, Role};
    use chrono::NaiveDate;

    fn session_with_chat_id(telegram_id: Option<i64>) -> SessionContext {
        let me = Profile {
            telegram_id,
            ..Profile::new(Role::RegionManager)
        };
        let id = me.id;
        let mut session = SessionContext::new();
        session.sign_in(id, vec![me]);
        session
    }

    fn filled_form() -> TaskForm {
        TaskForm {
            title: "Prepare the quarterly report".to_string(),
            client: "Acme".to_string(),
            due_date: "2026-03-01 18:00".to_string(),
            description: String::new(),
            assignee: Some(200),
            ..TaskForm::default()
        }
    }

    #[test]
    fn create_requires_title() {
        let session = session_with_chat_id(Some(100));
        let form = TaskForm {
            title: "   ".to_string(),
            ..filled_form()
        };
        let err = form.to_new_task(&session).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn create_requires_parseable_due_date() {
        let session = session_with_chat_id(Some(100));
        let form = TaskForm {
            due_date: "tomorrow".to_string(),
            ..filled_form()
        };
        assert!(form.to_new_task(&session).is_err());

        let form = TaskForm {
            due_date: String::new(),
            ..filled_form()
        };
        assert!(form.to_new_task(&session).is_err());
    }

    #[test]
    fn create_forces_default_status_and_session_assigner() {
        let session = session_with_chat_id(Some(100));
        let form = TaskForm {
            status: TaskStatus::Completed,
            ..filled_form()
        };
        let new_task = form.to_new_task(&session).unwrap();
        assert_eq!(new_task.status, TaskStatus::InProgress);
        assert_eq!(new_task.assigner_telegram_id, 100);
        assert_eq!(new_task.assignee_telegram_id, Some(200));
        assert_eq!(
            new_task.due_date,
            NaiveDate::from_ymd_opt(2026, 3, 1)
                .unwrap()
                .and_hms_opt(18, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn create_without_chat_id_is_rejected_locally() {
        let session = session_with_chat_id(None);
        let err = filled_form().to_new_task(&session).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn dash_means_no_client() {
        let session = session_with_chat_id(Some(100));
        let form = TaskForm {
            client: "-".to_string(),
            ..filled_form()
        };
        assert_eq!(form.to_new_task(&session).unwrap().client, None);
    }

    #[test]
    fn patch_carries_the_editable_fields_only() {
        let form = TaskForm {
            editing: Some(7),
            status: TaskStatus::Completed,
            ..filled_form()
        };
        let (id, patch) = form.to_patch().unwrap();
        assert_eq!(id, 7);
        assert_eq!(patch.status, Some(TaskStatus::Completed));
        assert_eq!(patch.title.as_deref(), Some("Prepare the quarterly report"));
        // Assigner and result are not touchable from the edit form.
        let json = serde_json::to_value(&patch).unwrap();
        assert!(json.get("assigner_telegram_id").is_none());
        assert!(json.get("result").is_none());
    }

    #[test]
    fn patch_without_target_is_rejected() {
        let form = filled_form();
        assert!(form.to_patch().is_err());
    }

    #[test]
    fn result_submission_moves_to_review() {
        let now = NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        let patch = result_submission("see the attached summary", now).unwrap();
        assert_eq!(patch.status, Some(TaskStatus::PendingReview));
        assert_eq!(patch.result.as_deref(), Some("see the attached summary"));
        assert_eq!(patch.updated_at, Some(now));
        assert!(patch.title.is_none());

        assert!(result_submission("  ", now).is_err());
    }

    #[test]
    fn from_task_rounds_the_form_fields() {
        let task = Task {
            id: 9,
            title: "Call back".to_string(),
            client: Some("Globex".to_string()),
            due_date: NaiveDate::from_ymd_opt(2026, 4, 1)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            description: None,
            result: None,
            status: TaskStatus::Overdue,
            assigner_telegram_id: 1,
            assignee_telegram_id: Some(2),
            comments: None,
            created_at: None,
            updated_at: None,
        };
        let form = TaskForm::from_task(&task);
        assert_eq!(form.editing, Some(9));
        assert_eq!(form.due_date, "2026-04-01 09:30");
        assert_eq!(form.client, "Globex");
        assert_eq!(form.status, TaskStatus::Overdue);
    }
}
