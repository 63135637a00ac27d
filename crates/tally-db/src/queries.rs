use crate::Database;
use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rusqlite::{Connection, params};
use tally_types::models::{Priority, Task, TaskDraft, TaskStatus};

impl Database {
    /// Insert a new open task and return its assigned id.
    pub fn create_task(
        &self,
        chat_id: i64,
        created_by_id: i64,
        created_by_username: &str,
        draft: &TaskDraft,
    ) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tasks (
                    chat_id, created_by_id, created_by_username,
                    title, assignee_username, due_date, priority, tags
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    chat_id,
                    created_by_id,
                    created_by_username,
                    draft.title,
                    draft.assignee_username,
                    draft.due_date.to_string(),
                    draft.priority.as_str(),
                    draft.tags,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// All open tasks in a chat, in listing order.
    pub fn list_open_tasks(&self, chat_id: i64) -> Result<Vec<Task>> {
        self.with_conn(|conn| query_open_tasks(conn, chat_id, None))
    }

    /// Open tasks in a chat assigned to `assignee`. The handle must already
    /// be normalized; matching is exact and case-sensitive.
    pub fn list_open_tasks_for(&self, chat_id: i64, assignee: &str) -> Result<Vec<Task>> {
        self.with_conn(|conn| query_open_tasks(conn, chat_id, Some(assignee)))
    }

    /// Mark a task done and return the updated row. Returns `None` with no
    /// side effect when the id does not exist in this chat; ids belonging
    /// to other chats look exactly like missing ids. Completing an
    /// already-done task succeeds again and refreshes `completed_at`.
    pub fn complete_task(&self, chat_id: i64, task_id: i64) -> Result<Option<Task>> {
        self.with_conn(|conn| {
            if query_task(conn, task_id, chat_id)?.is_none() {
                return Ok(None);
            }

            conn.execute(
                "UPDATE tasks SET status = 'done', completed_at = datetime('now') WHERE id = ?1",
                [task_id],
            )?;

            let updated = query_task(conn, task_id, chat_id)?
                .ok_or_else(|| anyhow!("task {} missing after completion", task_id))?;
            Ok(Some(updated))
        })
    }
}

const TASK_COLUMNS: &str = "id, chat_id, created_by_id, created_by_username, title, \
     assignee_username, due_date, priority, tags, status, created_at, completed_at";

/// Listing order: earliest due date first, then priority (high > medium >
/// low), then newest id. Priority is stored as text, so it is ranked
/// through a CASE expression rather than compared lexicographically.
const TASK_ORDER: &str = "ORDER BY due_date ASC, \
     CASE priority WHEN 'high' THEN 3 WHEN 'medium' THEN 2 ELSE 1 END DESC, \
     id DESC";

fn query_open_tasks(conn: &Connection, chat_id: i64, assignee: Option<&str>) -> Result<Vec<Task>> {
    let filter = if assignee.is_some() {
        " AND assignee_username = ?2 "
    } else {
        " "
    };
    let sql = format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE chat_id = ?1 AND status = 'open'{filter}{TASK_ORDER}"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = match assignee {
        Some(handle) => stmt.query_map(params![chat_id, handle], map_task_row)?,
        None => stmt.query_map(params![chat_id], map_task_row)?,
    }
    .collect::<std::result::Result<Vec<_>, _>>()?;

    rows.into_iter().map(TaskRow::into_task).collect()
}

fn query_task(conn: &Connection, task_id: i64, chat_id: i64) -> Result<Option<Task>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1 AND chat_id = ?2"
    ))?;

    let row = stmt
        .query_row(params![task_id, chat_id], map_task_row)
        .optional()?;

    row.map(TaskRow::into_task).transpose()
}

/// Raw column values, converted to the typed model in a second step so
/// the rusqlite row closure stays infallible beyond column access.
struct TaskRow {
    id: i64,
    chat_id: i64,
    created_by_id: i64,
    created_by_username: String,
    title: String,
    assignee_username: String,
    due_date: String,
    priority: String,
    tags: String,
    status: String,
    created_at: String,
    completed_at: Option<String>,
}

fn map_task_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TaskRow> {
    Ok(TaskRow {
        id: row.get(0)?,
        chat_id: row.get(1)?,
        created_by_id: row.get(2)?,
        created_by_username: row.get(3)?,
        title: row.get(4)?,
        assignee_username: row.get(5)?,
        due_date: row.get(6)?,
        priority: row.get(7)?,
        tags: row.get(8)?,
        status: row.get(9)?,
        created_at: row.get(10)?,
        completed_at: row.get(11)?,
    })
}

impl TaskRow {
    fn into_task(self) -> Result<Task> {
        let due_date = NaiveDate::parse_from_str(&self.due_date, "%Y-%m-%d")
            .map_err(|e| anyhow!("task {}: bad due_date '{}': {}", self.id, self.due_date, e))?;
        let priority = Priority::from_input(&self.priority)
            .ok_or_else(|| anyhow!("task {}: unknown priority '{}'", self.id, self.priority))?;
        let status = TaskStatus::from_db(&self.status)
            .ok_or_else(|| anyhow!("task {}: unknown status '{}'", self.id, self.status))?;
        let created_at = parse_timestamp(&self.created_at)?;
        let completed_at = self
            .completed_at
            .as_deref()
            .map(parse_timestamp)
            .transpose()?;

        Ok(Task {
            id: self.id,
            chat_id: self.chat_id,
            created_by_id: self.created_by_id,
            created_by_username: self.created_by_username,
            title: self.title,
            assignee_username: self.assignee_username,
            due_date,
            priority,
            tags: self.tags,
            status,
            created_at,
            completed_at,
        })
    }
}

/// SQLite's datetime('now') emits "YYYY-MM-DD HH:MM:SS" without a
/// timezone; treat it as UTC. RFC 3339 is accepted for rows written by
/// other tooling.
fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    value
        .parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .map_err(|e| anyhow!("bad timestamp '{}': {}", value, e))
}

/// Turns QueryReturnedNoRows into None instead of an error.
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
