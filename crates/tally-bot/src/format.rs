use tally_types::models::{Task, TaskStatus};

/// Render one task as a Markdown block for chat replies.
pub fn format_task(task: &Task) -> String {
    let tags = if task.tags.is_empty() { "-" } else { &task.tags };
    let status = match task.status {
        TaskStatus::Done => "✅ done",
        TaskStatus::Open => "🟡 open",
    };

    format!(
        "*#{}* {}\n👤 {} | ⏰ {} | ⚡ {}\n🏷 {}\nStatus: {}",
        task.id, task.title, task.assignee_username, task.due_date, task.priority, tags, status
    )
}

/// Join task blocks for a list reply.
pub fn format_task_list(tasks: &[Task]) -> String {
    tasks
        .iter()
        .map(format_task)
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use tally_types::models::Priority;

    fn task(id: i64, tags: &str, status: TaskStatus) -> Task {
        Task {
            id,
            chat_id: 1,
            created_by_id: 1,
            created_by_username: "@creator".to_string(),
            title: "Ship report".to_string(),
            assignee_username: "@alice".to_string(),
            due_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            priority: Priority::High,
            tags: tags.to_string(),
            status,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    #[test]
    fn open_task_block() {
        let text = format_task(&task(3, "urgent,q1", TaskStatus::Open));
        assert_eq!(
            text,
            "*#3* Ship report\n👤 @alice | ⏰ 2024-03-01 | ⚡ high\n🏷 urgent,q1\nStatus: 🟡 open"
        );
    }

    #[test]
    fn empty_tags_render_as_placeholder() {
        let text = format_task(&task(1, "", TaskStatus::Open));
        assert!(text.contains("🏷 -\n"));
    }

    #[test]
    fn done_task_shows_done_glyph() {
        let text = format_task(&task(1, "", TaskStatus::Done));
        assert!(text.ends_with("Status: ✅ done"));
    }

    #[test]
    fn list_joins_blocks_with_blank_lines() {
        let tasks = vec![task(1, "", TaskStatus::Open), task(2, "", TaskStatus::Open)];
        let text = format_task_list(&tasks);
        assert_eq!(text.matches("\n\n").count(), 1);
        assert!(text.contains("*#1*"));
        assert!(text.contains("*#2*"));
    }
}
