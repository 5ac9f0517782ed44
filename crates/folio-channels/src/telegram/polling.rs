//! Long-polling update loop and Channel trait implementation.

use super::types::{TgResponse, TgUpdate};
use super::TelegramChannel;
use async_trait::async_trait;
use folio_core::{
    error::FolioError,
    message::{EventKind, IncomingEvent, InlineKeyboard, MessageRef, OutgoingMessage, Sender},
    traits::Channel,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> Result<mpsc::Receiver<IncomingEvent>, FolioError> {
        self.register_commands().await;
        let bot_username = match self.get_me().await {
            Ok(me) => {
                info!("telegram: running as @{}", me.username.as_deref().unwrap_or("?"));
                me.username
            }
            Err(e) => {
                warn!("telegram getMe failed, accepting commands for any @bot: {e}");
                None
            }
        };

        let (tx, rx) = mpsc::channel(64);
        let client = self.client.clone();
        let base_url = self.base_url.clone();
        let poll_timeout = self.config.poll_timeout_secs;
        let last_update_id = self.last_update_id.clone();

        info!("Telegram channel starting long polling...");

        tokio::spawn(async move {
            let mut backoff_secs: u64 = 1;

            loop {
                let last = last_update_id.lock().await;
                let offset = last.map(|id| id + 1);
                drop(last);

                let mut url = format!(
                    "{base_url}/getUpdates?timeout={poll_timeout}\
                     &allowed_updates=%5B%22message%22%2C%22callback_query%22%5D"
                );
                if let Some(off) = offset {
                    url.push_str(&format!("&offset={off}"));
                }

                let resp = match client
                    .get(&url)
                    .timeout(Duration::from_secs(poll_timeout + 5))
                    .send()
                    .await
                {
                    Ok(r) => r,
                    Err(e) => {
                        error!(
                            "telegram poll error (retry in {backoff_secs}s): {}",
                            e.without_url()
                        );
                        tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(60);
                        continue;
                    }
                };

                let body: TgResponse<Vec<TgUpdate>> = match resp.json().await {
                    Ok(b) => b,
                    Err(e) => {
                        error!(
                            "telegram parse error (retry in {backoff_secs}s): {}",
                            e.without_url()
                        );
                        tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(60);
                        continue;
                    }
                };

                if !body.ok {
                    error!(
                        "telegram API error (retry in {backoff_secs}s): {}",
                        body.description.unwrap_or_default()
                    );
                    tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                    backoff_secs = (backoff_secs * 2).min(60);
                    continue;
                }

                // Successful poll -- reset backoff.
                backoff_secs = 1;

                let updates = body.result.unwrap_or_default();

                if let Some(last_update) = updates.last() {
                    *last_update_id.lock().await = Some(last_update.update_id);
                }

                for update in updates {
                    let update_id = update.update_id;
                    let Some(event) = update_to_event(update, bot_username.as_deref()) else {
                        debug!("telegram: skipping update {update_id}");
                        continue;
                    };

                    if tx.send(event).await.is_err() {
                        info!("telegram channel receiver dropped, stopping poll");
                        return;
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn send(&self, message: OutgoingMessage) -> Result<MessageRef, FolioError> {
        self.send_text(message.chat_id, &message.text, message.keyboard.as_ref())
            .await
    }

    async fn edit(
        &self,
        target: MessageRef,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), FolioError> {
        self.edit_text(target, text, keyboard).await
    }

    async fn delete(&self, target: MessageRef) -> Result<(), FolioError> {
        self.delete_message(target).await
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), FolioError> {
        self.answer_callback_query(callback_id).await
    }

    async fn stop(&self) -> Result<(), FolioError> {
        info!("Telegram channel stopped");
        Ok(())
    }
}

/// Turn a raw update into an [`IncomingEvent`].
///
/// Returns `None` for updates the bot does not react to: non-text messages,
/// messages without a sender, and anything sent by a bot. `bot_username`
/// decides which `/cmd@bot` commands are ours.
pub(crate) fn update_to_event(
    update: TgUpdate,
    bot_username: Option<&str>,
) -> Option<IncomingEvent> {
    let (user, chat_id, kind) = if let Some(cb) = update.callback_query {
        let message = cb.message.as_ref().map(|m| MessageRef {
            chat_id: m.chat.id,
            message_id: m.message_id,
        });
        // Without the message we fall back to the user's private chat.
        let chat_id = message.map_or(cb.from.id, |m| m.chat_id);
        let kind = EventKind::Callback {
            callback_id: cb.id,
            data: cb.data.unwrap_or_default(),
            message,
        };
        (cb.from, chat_id, kind)
    } else {
        let msg = update.message?;
        let text = msg.text?;
        let user = msg.from?;
        (
            user,
            msg.chat.id,
            EventKind::from_text(msg.message_id, text, bot_username),
        )
    };

    if user.is_bot {
        return None;
    }

    Some(IncomingEvent {
        id: Uuid::new_v4(),
        channel: "telegram".to_string(),
        sender: Sender {
            id: user.id,
            display_name: user.display_name(),
            username: user.username,
        },
        chat_id,
        timestamp: chrono::Utc::now(),
        kind,
    })
}
