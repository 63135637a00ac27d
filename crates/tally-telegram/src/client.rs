use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::types::{ApiResponse, Message, Update, User};

const API_BASE: &str = "https://api.telegram.org";

/// Request timeout for ordinary calls. Long polls derive their own from
/// the poll window.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the Bot API transport. Messages never carry the request
/// URL, which embeds the bot token.
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    /// Transport-level failure (connect, timeout, malformed body).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The API answered with ok=false.
    #[error("Telegram API error: {0}")]
    Api(String),
}

pub struct Client {
    http: reqwest::Client,
    base: String,
}

impl Client {
    pub fn new(token: &str) -> Result<Self, TelegramError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TelegramError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base: format!("{API_BASE}/bot{token}"),
        })
    }

    /// Identify the bot account. Doubles as a startup token check.
    pub async fn get_me(&self) -> Result<User, TelegramError> {
        self.call("getMe", &json!({}), None).await
    }

    /// Long-poll for updates past `offset`. The server holds the request
    /// open for up to `timeout_secs` when nothing is pending.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        let payload = json!({
            "offset": offset,
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });

        // Request timeout must outlive the server-side poll window.
        let timeout = Duration::from_secs(timeout_secs + 10);
        self.call("getUpdates", &payload, Some(timeout)).await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markdown: bool,
    ) -> Result<(), TelegramError> {
        let mut payload = json!({ "chat_id": chat_id, "text": text });
        if markdown {
            payload["parse_mode"] = json!("Markdown");
        }

        let _sent: Message = self.call("sendMessage", &payload, None).await?;
        Ok(())
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        payload: &serde_json::Value,
        timeout: Option<Duration>,
    ) -> Result<T, TelegramError> {
        debug!("calling {}", method);

        let mut request = self
            .http
            .post(format!("{}/{}", self.base, method))
            .json(payload);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response: ApiResponse<T> = request
            .send()
            .await
            .map_err(strip_url)?
            .json()
            .await
            .map_err(strip_url)?;

        if !response.ok {
            return Err(TelegramError::Api(
                response
                    .description
                    .unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        response
            .result
            .ok_or_else(|| TelegramError::Api("ok response with no result".to_string()))
    }
}

fn strip_url(err: reqwest::Error) -> TelegramError {
    TelegramError::Http(err.without_url().to_string())
}
