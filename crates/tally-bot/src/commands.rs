use anyhow::Result;
use tally_db::Database;
use tracing::info;

use crate::format::format_task_list;
use crate::parse::{NEWTASK_USAGE, display_handle, parse_task_draft};

/// Who issued the command, as reported by the chat platform.
#[derive(Debug, Clone)]
pub struct Requester {
    pub id: i64,
    pub username: Option<String>,
}

/// A recognized bot command with its raw argument text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    NewTask(String),
    Tasks,
    MyTasks,
    Done(String),
}

impl Command {
    /// Extract a command from a message. Commands may carry a `@botname`
    /// suffix in group chats; a suffix addressing a different bot means
    /// the message is not for us.
    pub fn parse(text: &str, bot_username: Option<&str>) -> Option<Self> {
        let text = text.trim();
        let rest = text.strip_prefix('/')?;

        let (head, args) = match rest.split_once(char::is_whitespace) {
            Some((head, args)) => (head, args.trim()),
            None => (rest, ""),
        };

        let name = match head.split_once('@') {
            Some((name, suffix)) => {
                if let Some(bot) = bot_username {
                    if !suffix.eq_ignore_ascii_case(bot) {
                        return None;
                    }
                }
                name
            }
            None => head,
        };

        match name {
            "start" => Some(Self::Start),
            "help" => Some(Self::Help),
            "newtask" => Some(Self::NewTask(args.to_string())),
            "tasks" => Some(Self::Tasks),
            "mytasks" => Some(Self::MyTasks),
            "done" => Some(Self::Done(args.to_string())),
            _ => None,
        }
    }
}

/// Reply text plus whether it needs Markdown rendering. Task listings use
/// `*bold*` ids; everything else is plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub markdown: bool,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markdown: false,
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markdown: true,
        }
    }
}

/// Handle one command against the store and produce the reply. Rejections
/// (validation, not-found) are replies, not errors; an `Err` here means
/// the store itself failed and the caller answers with a generic failure
/// line.
pub fn handle_command(
    db: &Database,
    chat_id: i64,
    requester: &Requester,
    command: Command,
) -> Result<Reply> {
    match command {
        Command::Start | Command::Help => Ok(Reply::plain(HELP_TEXT)),
        Command::NewTask(raw) => new_task(db, chat_id, requester, &raw),
        Command::Tasks => list_tasks(db, chat_id),
        Command::MyTasks => list_my_tasks(db, chat_id, requester),
        Command::Done(raw) => complete(db, chat_id, &raw),
    }
}

const HELP_TEXT: &str = "Hi! I'm a mini task tracker for teams.\n\n\
    Commands:\n\
    • /newtask Title | @assignee | YYYY-MM-DD | low|medium|high | tag1,tag2\n\
    • /tasks - all open tasks\n\
    • /mytasks - my open tasks\n\
    • /done ID - close a task\n\
    • /help - this message";

fn new_task(db: &Database, chat_id: i64, requester: &Requester, raw: &str) -> Result<Reply> {
    if raw.trim().is_empty() {
        return Ok(Reply::plain(format!("Usage:\n{NEWTASK_USAGE}")));
    }

    let draft = match parse_task_draft(raw) {
        Ok(draft) => draft,
        Err(reason) => return Ok(Reply::plain(reason.to_string())),
    };

    let creator = display_handle(requester.id, requester.username.as_deref());
    let task_id = db.create_task(chat_id, requester.id, &creator, &draft)?;

    info!("task #{} created in chat {} by {}", task_id, chat_id, creator);
    Ok(Reply::plain(format!("Task created: #{task_id}")))
}

fn list_tasks(db: &Database, chat_id: i64) -> Result<Reply> {
    let tasks = db.list_open_tasks(chat_id)?;
    if tasks.is_empty() {
        return Ok(Reply::plain("No open tasks 🎉"));
    }
    Ok(Reply::markdown(format_task_list(&tasks)))
}

fn list_my_tasks(db: &Database, chat_id: i64, requester: &Requester) -> Result<Reply> {
    let handle = display_handle(requester.id, requester.username.as_deref());
    let tasks = db.list_open_tasks_for(chat_id, &handle)?;
    if tasks.is_empty() {
        return Ok(Reply::plain("You have no open tasks."));
    }
    Ok(Reply::markdown(format_task_list(&tasks)))
}

fn complete(db: &Database, chat_id: i64, raw: &str) -> Result<Reply> {
    let Some(task_id) = parse_done_id(raw) else {
        return Ok(Reply::plain("Usage: /done ID"));
    };

    match db.complete_task(chat_id, task_id)? {
        Some(task) => {
            info!("task #{} closed in chat {}", task.id, chat_id);
            Ok(Reply::plain(format!("Task #{} closed ✅", task.id)))
        }
        None => Ok(Reply::plain("Task not found.")),
    }
}

/// The /done argument must be exactly one all-digit token.
fn parse_done_id(raw: &str) -> Option<i64> {
    let mut tokens = raw.split_whitespace();
    let token = tokens.next()?;
    if tokens.next().is_some() {
        return None;
    }
    if !token.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requester(username: Option<&str>) -> Requester {
        Requester {
            id: 100,
            username: username.map(str::to_string),
        }
    }

    #[test]
    fn parses_bare_commands() {
        assert_eq!(Command::parse("/tasks", None), Some(Command::Tasks));
        assert_eq!(Command::parse("/mytasks", None), Some(Command::MyTasks));
        assert_eq!(Command::parse("/help", None), Some(Command::Help));
        assert_eq!(Command::parse("/start", None), Some(Command::Start));
    }

    #[test]
    fn parses_arguments() {
        assert_eq!(
            Command::parse("/newtask a | b | c | d | e", None),
            Some(Command::NewTask("a | b | c | d | e".to_string()))
        );
        assert_eq!(
            Command::parse("/done 3", None),
            Some(Command::Done("3".to_string()))
        );
        assert_eq!(
            Command::parse("/done", None),
            Some(Command::Done(String::new()))
        );
    }

    #[test]
    fn strips_own_botname_suffix() {
        assert_eq!(
            Command::parse("/tasks@tally_bot", Some("tally_bot")),
            Some(Command::Tasks)
        );
        assert_eq!(
            Command::parse("/tasks@TALLY_BOT", Some("tally_bot")),
            Some(Command::Tasks)
        );
    }

    #[test]
    fn ignores_commands_for_other_bots() {
        assert_eq!(Command::parse("/tasks@other_bot", Some("tally_bot")), None);
    }

    #[test]
    fn ignores_non_commands() {
        assert_eq!(Command::parse("hello", None), None);
        assert_eq!(Command::parse("/unknown", None), None);
        assert_eq!(Command::parse("", None), None);
    }

    #[test]
    fn done_id_requires_one_digit_token() {
        assert_eq!(parse_done_id("3"), Some(3));
        assert_eq!(parse_done_id("  12 "), Some(12));
        assert_eq!(parse_done_id(""), None);
        assert_eq!(parse_done_id("abc"), None);
        assert_eq!(parse_done_id("-3"), None);
        assert_eq!(parse_done_id("1 2"), None);
    }

    #[test]
    fn newtask_without_args_replies_with_usage() {
        let db = Database::open_in_memory().unwrap();
        let reply = handle_command(
            &db,
            1,
            &requester(Some("bob")),
            Command::NewTask(String::new()),
        )
        .unwrap();
        assert!(reply.text.starts_with("Usage:"));
        assert!(db.list_open_tasks(1).unwrap().is_empty());
    }

    #[test]
    fn rejected_input_inserts_nothing() {
        let db = Database::open_in_memory().unwrap();
        let reply = handle_command(
            &db,
            1,
            &requester(Some("bob")),
            Command::NewTask("Ship report | alice | 2024-03-01 | urgent | tag".to_string()),
        )
        .unwrap();
        assert_eq!(reply.text, "Priority must be one of: low, medium, high.");
        assert!(db.list_open_tasks(1).unwrap().is_empty());
    }

    #[test]
    fn help_lists_every_command() {
        let db = Database::open_in_memory().unwrap();
        let reply = handle_command(&db, 1, &requester(None), Command::Help).unwrap();
        for command in ["/newtask", "/tasks", "/mytasks", "/done", "/help"] {
            assert!(reply.text.contains(command), "missing {command}");
        }
        assert!(!reply.markdown);
    }

    #[test]
    fn empty_listings_reply_plain() {
        let db = Database::open_in_memory().unwrap();
        let reply = handle_command(&db, 1, &requester(None), Command::Tasks).unwrap();
        assert_eq!(reply.text, "No open tasks 🎉");

        let reply = handle_command(&db, 1, &requester(None), Command::MyTasks).unwrap();
        assert_eq!(reply.text, "You have no open tasks.");
    }
}
