use std::path::PathBuf;

use anyhow::{Context, Result};

/// Process configuration, read once at startup and passed down
/// explicitly. Never consulted as ambient state after this.
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub db_path: PathBuf,
    pub poll_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN")
            .context("TELEGRAM_BOT_TOKEN must be set (see .env.example)")?;

        let db_path: PathBuf = std::env::var("TALLY_DB_PATH")
            .unwrap_or_else(|_| "tally.db".into())
            .into();

        let poll_timeout_secs: u64 = std::env::var("TALLY_POLL_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            bot_token,
            db_path,
            poll_timeout_secs,
        })
    }
}
