use chrono::NaiveDate;
use tally_types::models::{Priority, TaskDraft};

/// Argument format for /newtask, echoed back on malformed input.
pub const NEWTASK_USAGE: &str =
    "/newtask Title | @assignee | YYYY-MM-DD | low|medium|high | tag1,tag2";

/// A rejected task request. The Display text is sent to the requester
/// verbatim as the reply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Expected format:\n{NEWTASK_USAGE}")]
    FieldCount,

    #[error("Task title cannot be empty.")]
    EmptyTitle,

    #[error("Due date must be a valid YYYY-MM-DD date.")]
    BadDueDate,

    #[error("Priority must be one of: low, medium, high.")]
    BadPriority,
}

/// Parse the raw /newtask argument string into a validated draft.
///
/// The input is split on `|` into exactly five trimmed fields: title,
/// assignee, due date, priority, tags. Fields are checked left to right
/// and the first violation wins; there is no partial result.
pub fn parse_task_draft(raw: &str) -> Result<TaskDraft, ValidationError> {
    let parts: Vec<&str> = raw.split('|').map(str::trim).collect();
    let [title, assignee, due_date, priority, tags] = parts.as_slice() else {
        return Err(ValidationError::FieldCount);
    };

    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }

    let assignee_username = normalize_username(assignee);

    let due_date = NaiveDate::parse_from_str(due_date, "%Y-%m-%d")
        .map_err(|_| ValidationError::BadDueDate)?;

    let priority = Priority::from_input(priority).ok_or(ValidationError::BadPriority)?;

    Ok(TaskDraft {
        title: (*title).to_string(),
        assignee_username,
        due_date,
        priority,
        tags: (*tags).to_string(),
    })
}

/// Trim and prefix with `@` if absent. An empty input normalizes to a
/// bare `@`, which is accepted and simply never matches a real handle.
pub fn normalize_username(value: &str) -> String {
    let username = value.trim();
    if username.starts_with('@') {
        username.to_string()
    } else {
        format!("@{username}")
    }
}

/// The requester's handle as stored on tasks they create or are assigned.
/// Falls back to a synthetic handle when the platform gives no username.
pub fn display_handle(user_id: i64, username: Option<&str>) -> String {
    match username {
        Some(name) => normalize_username(name),
        None => normalize_username(&format!("user_{user_id}")),
    }
}
