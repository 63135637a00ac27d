use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS tasks (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            chat_id             INTEGER NOT NULL,
            created_by_id       INTEGER NOT NULL,
            created_by_username TEXT NOT NULL,
            title               TEXT NOT NULL,
            assignee_username   TEXT NOT NULL,
            due_date            TEXT NOT NULL,
            priority            TEXT NOT NULL,
            tags                TEXT NOT NULL DEFAULT '',
            status              TEXT NOT NULL DEFAULT 'open',
            created_at          TEXT NOT NULL DEFAULT (datetime('now')),
            completed_at        TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_tasks_chat_status
            ON tasks(chat_id, status);
        ",
    )?;

    info!("Schema migrations complete");
    Ok(())
}
