use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};

/// Task priority. Stored lowercase in the database; input matching is
/// case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Case-insensitive parse of user/database input.
    pub fn from_input(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Listing rank: high outranks medium outranks low. The database
    /// stores priorities as text, so queries rank through the same
    /// mapping rather than comparing the strings themselves.
    pub fn rank(self) -> i64 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task lifecycle state. Transitions one way: open -> done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Open,
    Done,
}

impl TaskStatus {
    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "open" => Some(Self::Open),
            "done" => Some(Self::Done),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored task. `chat_id` scopes every read; a task is never visible
/// outside the chat that created it.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: i64,
    pub chat_id: i64,
    pub created_by_id: i64,
    pub created_by_username: String,
    pub title: String,
    pub assignee_username: String,
    pub due_date: NaiveDate,
    pub priority: Priority,
    pub tags: String,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// A validated task request, ready for insertion. Produced by the
/// command validator; never built from unchecked input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub assignee_username: String,
    pub due_date: NaiveDate,
    pub priority: Priority,
    pub tags: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_parse_is_case_insensitive() {
        assert_eq!(Priority::from_input("HIGH"), Some(Priority::High));
        assert_eq!(Priority::from_input("Medium"), Some(Priority::Medium));
        assert_eq!(Priority::from_input("low"), Some(Priority::Low));
        assert_eq!(Priority::from_input("urgent"), None);
        assert_eq!(Priority::from_input(""), None);
    }

    #[test]
    fn priority_rank_orders_high_first() {
        assert!(Priority::High.rank() > Priority::Medium.rank());
        assert!(Priority::Medium.rank() > Priority::Low.rank());
    }

    #[test]
    fn status_round_trips_through_db_text() {
        assert_eq!(TaskStatus::from_db("open"), Some(TaskStatus::Open));
        assert_eq!(TaskStatus::from_db("done"), Some(TaskStatus::Done));
        assert_eq!(TaskStatus::from_db("OPEN"), None);
        assert_eq!(TaskStatus::Done.as_str(), "done");
    }
}
