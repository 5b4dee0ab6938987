//! Bot API chat client.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// Outbound chat message seam.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Deliver `text` to one chat.
    async fn send_message(&self, chat_id: i64, text: &str) -> anyhow::Result<()>;
}

/// One inbound chat update.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    /// Monotonic update id, used as the long-poll offset.
    pub update_id: i64,
    /// The message, when the update carries one.
    pub message: Option<UpdateMessage>,
}

/// An inbound message.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMessage {
    /// Chat the message came from.
    pub chat: Chat,
    /// Message text, when textual.
    pub text: Option<String>,
    /// Sender, when known.
    pub from: Option<User>,
}

/// A chat.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Chat {
    /// Chat identifier.
    pub id: i64,
}

/// A chat user.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    /// Public username, when set.
    pub username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

/// HTTP client for a Telegram-style Bot API.
pub struct BotClient {
    http: reqwest::Client,
    base_url: String,
}

impl BotClient {
    /// Build the client from the bot token.
    #[must_use]
    pub fn new(http: reqwest::Client, token: &str) -> Self {
        Self {
            http,
            base_url: format!("https://api.telegram.org/bot{token}"),
        }
    }

    /// Override the API host (tests).
    #[must_use]
    pub fn with_base_url(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Long-poll for inbound updates past `offset`.
    ///
    /// # Errors
    ///
    /// Fails on transport errors or an API-level rejection.
    pub async fn get_updates(&self, offset: i64) -> anyhow::Result<Vec<Update>> {
        let response = self
            .http
            .post(format!("{}/getUpdates", self.base_url))
            .json(&json!({ "offset": offset, "timeout": 30 }))
            .send()
            .await?;

        let envelope: ApiEnvelope<Vec<Update>> = response.json().await?;
        if !envelope.ok {
            anyhow::bail!(
                "getUpdates rejected: {}",
                envelope.description.unwrap_or_default()
            );
        }

        let updates = envelope.result.unwrap_or_default();
        debug!(count = updates.len(), "updates received");
        Ok(updates)
    }
}

#[async_trait]
impl MessageSender for BotClient {
    async fn send_message(&self, chat_id: i64, text: &str) -> anyhow::Result<()> {
        let response = self
            .http
            .post(format!("{}/sendMessage", self.base_url))
            .json(&json!({
                "chat_id": chat_id,
                "text": text,
                "parse_mode": "Markdown",
            }))
            .send()
            .await?;

        let envelope: ApiEnvelope<serde_json::Value> = response.json().await?;
        if !envelope.ok {
            anyhow::bail!(
                "sendMessage to chat {chat_id} rejected: {}",
                envelope.description.unwrap_or_default()
            );
        }
        Ok(())
    }
}
