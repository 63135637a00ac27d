mod config;

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use tally_bot::commands::{self, Command, Reply, Requester};
use tally_db::Database;
use tally_telegram::Client;
use tally_telegram::types::Update;

use crate::config::Config;

/// Pause before retrying after a failed poll, so a dead network does not
/// spin the loop.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tally=debug".into()),
        )
        .init();

    // Config
    let config = Config::from_env()?;

    // Init database
    let db = Arc::new(Database::open(&config.db_path)?);

    // Transport; getMe fails fast on a bad token and tells us the bot's
    // username for /cmd@botname routing in group chats.
    let client = Client::new(&config.bot_token)
        .map_err(|e| anyhow::anyhow!("failed to set up Telegram client: {e}"))?;
    let me = client
        .get_me()
        .await
        .map_err(|e| anyhow::anyhow!("token check failed: {e}"))?;
    let bot_username = me.username;
    info!(
        "Bot started as @{}",
        bot_username.as_deref().unwrap_or("<unnamed>")
    );

    tokio::select! {
        result = poll_updates(&client, &db, bot_username.as_deref(), config.poll_timeout_secs) => result,
        result = shutdown_signal() => result,
    }
}

async fn poll_updates(
    client: &Client,
    db: &Arc<Database>,
    bot_username: Option<&str>,
    poll_timeout_secs: u64,
) -> anyhow::Result<()> {
    let mut offset = 0i64;

    loop {
        let updates = match client.get_updates(offset, poll_timeout_secs).await {
            Ok(updates) => updates,
            Err(e) => {
                warn!("getUpdates failed: {}", e);
                tokio::time::sleep(POLL_RETRY_DELAY).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            handle_update(client, db, bot_username, update).await;
        }
    }
}

/// Handle one update end to end: extract the command, run it against the
/// store, send the reply. A failed command answers with a generic failure
/// line; the loop itself never dies from a single bad command.
async fn handle_update(
    client: &Client,
    db: &Arc<Database>,
    bot_username: Option<&str>,
    update: Update,
) {
    let Some(message) = update.message else { return };
    let Some(text) = message.text else { return };
    let Some(from) = message.from else { return };
    let chat_id = message.chat.id;

    let Some(command) = Command::parse(&text, bot_username) else {
        return;
    };

    let requester = Requester {
        id: from.id,
        username: from.username,
    };

    // Run blocking DB work off the async runtime
    let db = db.clone();
    let result = tokio::task::spawn_blocking(move || {
        commands::handle_command(&db, chat_id, &requester, command)
    })
    .await;

    let reply = match result {
        Ok(Ok(reply)) => reply,
        Ok(Err(e)) => {
            error!("command failed in chat {}: {:#}", chat_id, e);
            Reply::plain("Something went wrong. Please try again.")
        }
        Err(e) => {
            error!("spawn_blocking join error: {}", e);
            Reply::plain("Something went wrong. Please try again.")
        }
    };

    if let Err(e) = client.send_message(chat_id, &reply.text, reply.markdown).await {
        warn!("failed to reply in chat {}: {}", chat_id, e);
    }
}

async fn shutdown_signal() -> anyhow::Result<()> {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .map_err(|e| anyhow::anyhow!("failed to install SIGTERM handler: {e}"))?;
        tokio::select! {
            _ = ctrl_c => info!("Ctrl+C received, stopping"),
            _ = sigterm.recv() => info!("SIGTERM received, stopping"),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Ctrl+C received, stopping");
    }
    Ok(())
}
