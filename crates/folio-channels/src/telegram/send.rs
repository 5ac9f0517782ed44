//! Outbound Bot API calls: send, edit, delete, callback answers and
//! command registration.

use super::types::{TgInlineKeyboardMarkup, TgMessage, TgResponse, TgUser};
use super::{TelegramChannel, MAX_MESSAGE_LEN};
use crate::utils::split_message;
use folio_core::{
    error::FolioError,
    message::{InlineKeyboard, MessageRef},
};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

impl TelegramChannel {
    /// POST a Bot API method and unwrap its `result`.
    ///
    /// The request URL embeds the bot token, so transport errors are
    /// reported without it.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<T, FolioError> {
        let url = format!("{}/{method}", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                FolioError::Delivery(format!("telegram {method} failed: {}", e.without_url()))
            })?;

        let status = resp.status();
        let parsed: TgResponse<T> = resp.json().await.map_err(|e| {
            FolioError::Delivery(format!(
                "telegram {method} parse failed ({status}): {}",
                e.without_url()
            ))
        })?;

        if !parsed.ok {
            return Err(FolioError::Delivery(format!(
                "telegram {method} failed ({status}): {}",
                parsed.description.unwrap_or_default()
            )));
        }

        parsed
            .result
            .ok_or_else(|| FolioError::Delivery(format!("telegram {method} returned no result")))
    }

    /// Send a text message, splitting it if it exceeds Telegram's limit.
    /// Buttons go on the last chunk, whose reference is returned.
    pub(crate) async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<MessageRef, FolioError> {
        let chunks = split_message(text, MAX_MESSAGE_LEN);
        let last = chunks.len().saturating_sub(1);
        let mut sent = None;

        for (i, chunk) in chunks.into_iter().enumerate() {
            let mut body = serde_json::json!({
                "chat_id": chat_id,
                "text": chunk,
            });
            if i == last {
                if let Some(kb) = keyboard {
                    body["reply_markup"] = serde_json::to_value(TgInlineKeyboardMarkup::from(kb))?;
                }
            }

            let msg: TgMessage = self.call("sendMessage", &body).await?;
            sent = Some(MessageRef {
                chat_id: msg.chat.id,
                message_id: msg.message_id,
            });
        }

        sent.ok_or_else(|| FolioError::Delivery("telegram sendMessage: nothing to send".into()))
    }

    /// Replace the text of an existing message. An edit cannot span
    /// messages, so over-long text is cut to the first chunk.
    pub(crate) async fn edit_text(
        &self,
        target: MessageRef,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), FolioError> {
        let text = split_message(text, MAX_MESSAGE_LEN)
            .into_iter()
            .next()
            .unwrap_or_default();
        let mut body = serde_json::json!({
            "chat_id": target.chat_id,
            "message_id": target.message_id,
            "text": text,
        });
        if let Some(kb) = keyboard {
            body["reply_markup"] = serde_json::to_value(TgInlineKeyboardMarkup::from(kb))?;
        }

        // Success returns the edited Message, which we don't need.
        match self
            .call::<serde_json::Value>("editMessageText", &body)
            .await
        {
            Ok(_) => Ok(()),
            Err(FolioError::Delivery(e)) if is_not_modified(&e) => {
                debug!(
                    "telegram: message {} already shows this text",
                    target.message_id
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Delete a message from a chat.
    pub(crate) async fn delete_message(&self, target: MessageRef) -> Result<(), FolioError> {
        let body = serde_json::json!({
            "chat_id": target.chat_id,
            "message_id": target.message_id,
        });
        let _: bool = self.call("deleteMessage", &body).await?;
        Ok(())
    }

    /// Acknowledge a callback query.
    pub(crate) async fn answer_callback_query(&self, callback_id: &str) -> Result<(), FolioError> {
        let body = serde_json::json!({ "callback_query_id": callback_id });
        let _: bool = self.call("answerCallbackQuery", &body).await?;
        Ok(())
    }

    /// The bot's own account.
    pub(crate) async fn get_me(&self) -> Result<TgUser, FolioError> {
        self.call("getMe", &serde_json::json!({})).await
    }

    /// Register bot commands with Telegram so users see an autocomplete menu.
    /// Best-effort: logs failures but does not propagate errors.
    pub(crate) async fn register_commands(&self) {
        let commands = serde_json::json!({
            "commands": [
                { "command": "start", "description": "Choose a language / 选择语言" },
            ]
        });

        match self.call::<bool>("setMyCommands", &commands).await {
            Ok(_) => info!("registered Telegram bot commands"),
            Err(e) => warn!("failed to register Telegram bot commands: {e}"),
        }
    }
}

/// Telegram rejects edits that would leave a message unchanged, e.g. when
/// the same language button is pressed twice.
pub(crate) fn is_not_modified(description: &str) -> bool {
    description.contains("message is not modified")
}
