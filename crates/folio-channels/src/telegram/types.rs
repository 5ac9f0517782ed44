//! Telegram Bot API (de)serialization types.

use folio_core::message::InlineKeyboard;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct TgResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgUpdate {
    pub update_id: i64,
    pub message: Option<TgMessage>,
    pub callback_query: Option<TgCallbackQuery>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgMessage {
    pub message_id: i64,
    pub from: Option<TgUser>,
    pub chat: TgChat,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgUser {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl TgUser {
    pub fn display_name(&self) -> String {
        match self.last_name {
            Some(ref ln) => format!("{} {ln}", self.first_name),
            None => self.first_name.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgChat {
    pub id: i64,
}

/// An inline button press. `message` is absent when the message carrying
/// the button is too old for Telegram to include.
#[derive(Debug, Deserialize)]
pub(crate) struct TgCallbackQuery {
    pub id: String,
    pub from: TgUser,
    pub message: Option<TgMessage>,
    pub data: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TgInlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<TgInlineButton>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TgInlineButton {
    pub text: String,
    pub callback_data: String,
}

impl From<&InlineKeyboard> for TgInlineKeyboardMarkup {
    fn from(keyboard: &InlineKeyboard) -> Self {
        Self {
            inline_keyboard: keyboard
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|b| TgInlineButton {
                            text: b.text.clone(),
                            callback_data: b.callback_data.clone(),
                        })
                        .collect()
                })
                .collect(),
        }
    }
}
