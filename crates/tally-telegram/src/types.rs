//! The slice of the Telegram Bot API wire format this bot consumes.
//! Unknown fields are ignored on deserialize.

use serde::Deserialize;

/// Every Bot API method responds with this envelope.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_a_get_updates_payload() {
        let json = r#"{
            "ok": true,
            "result": [{
                "update_id": 900001,
                "message": {
                    "message_id": 5,
                    "from": {"id": 100, "is_bot": false, "first_name": "Alice", "username": "alice"},
                    "chat": {"id": -100200, "type": "group", "title": "Team"},
                    "date": 1700000000,
                    "text": "/tasks"
                }
            }]
        }"#;

        let resp: ApiResponse<Vec<Update>> = serde_json::from_str(json).unwrap();
        assert!(resp.ok);
        let updates = resp.result.unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].update_id, 900001);

        let message = updates[0].message.as_ref().unwrap();
        assert_eq!(message.chat.id, -100200);
        assert_eq!(message.text.as_deref(), Some("/tasks"));
        assert_eq!(message.from.as_ref().unwrap().username.as_deref(), Some("alice"));
    }

    #[test]
    fn deserializes_updates_without_message_or_sender() {
        let json = r#"{"update_id": 1}"#;
        let update: Update = serde_json::from_str(json).unwrap();
        assert!(update.message.is_none());

        let json = r#"{
            "update_id": 2,
            "message": {"message_id": 1, "chat": {"id": 3, "type": "private"}, "date": 0}
        }"#;
        let update: Update = serde_json::from_str(json).unwrap();
        let message = update.message.unwrap();
        assert!(message.from.is_none());
        assert!(message.text.is_none());
    }

    #[test]
    fn deserializes_an_error_envelope() {
        let json = r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#;
        let resp: ApiResponse<Vec<Update>> = serde_json::from_str(json).unwrap();
        assert!(!resp.ok);
        assert!(resp.result.is_none());
        assert_eq!(resp.description.as_deref(), Some("Unauthorized"));
    }
}
