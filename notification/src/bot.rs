//! Inbound `/start` command loop.

use crate::client::{BotClient, MessageSender};
use crate::registry::SubscriberRegistry;
use crate::render;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Long-poll the Bot API for inbound commands until `shutdown` fires.
///
/// Every chat that sends `/start` gets the welcome message and is
/// registered for notifications. Poll failures back off and the loop
/// keeps going; only shutdown ends it.
pub async fn run_start_command_loop(
    client: Arc<BotClient>,
    registry: Arc<SubscriberRegistry>,
    mut shutdown: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    info!("chat command loop running");
    let mut offset = 0_i64;

    loop {
        let updates = tokio::select! {
            _ = shutdown.recv() => {
                info!("chat command loop stopping");
                return Ok(());
            }
            result = client.get_updates(offset) => match result {
                Ok(updates) => updates,
                Err(e) => {
                    warn!(error = %e, "failed to poll updates, retrying");
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    continue;
                }
            },
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);

            let Some(message) = update.message else {
                continue;
            };
            if message.text.as_deref() != Some("/start") {
                continue;
            }

            let username = message
                .from
                .and_then(|u| u.username)
                .unwrap_or_default();
            info!(chat_id = message.chat.id, username = %username, "new subscriber");

            if let Err(e) = client.send_message(message.chat.id, render::WELCOME).await {
                warn!(chat_id = message.chat.id, error = %e, "failed to send welcome message");
            }

            registry.add_chat(message.chat.id).await;
        }
    }
}
