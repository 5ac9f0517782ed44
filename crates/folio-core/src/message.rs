use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Points at one message in one chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i64,
}

/// A button under a message that reports `callback_data` when pressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineButton {
    pub text: String,
    pub callback_data: String,
}

/// Rows of inline buttons.
pub type InlineKeyboard = Vec<Vec<InlineButton>>;

/// Who sent an incoming event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    /// Platform-specific user ID.
    pub id: i64,
    /// Public handle without the leading `@`, if the user has one.
    pub username: Option<String>,
    /// First and last name as shown by the platform.
    pub display_name: String,
}

impl Sender {
    /// How the sender is identified to the admin: `@username` when
    /// available, otherwise the display name and numeric id.
    pub fn handle(&self) -> String {
        match self.username.as_deref() {
            Some(un) if !un.is_empty() => format!("@{un}"),
            _ => format!("{} (id {})", self.display_name, self.id),
        }
    }
}

/// An incoming event from a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingEvent {
    pub id: Uuid,
    /// Channel name (e.g. "telegram").
    pub channel: String,
    pub sender: Sender,
    /// Chat the event happened in.
    pub chat_id: i64,
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
}

/// The three kinds of events the conversation reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// A `/command` addressed to this bot, with any `@botname` suffix
    /// stripped. `text` is the message exactly as typed.
    Command {
        message_id: i64,
        name: String,
        args: String,
        text: String,
    },
    /// An inline button press.
    Callback {
        callback_id: String,
        data: String,
        /// The message carrying the button, if the platform still exposes it.
        message: Option<MessageRef>,
    },
    /// A plain text message.
    Text { message_id: i64, text: String },
}

impl EventKind {
    /// Classify message text as a command or plain text.
    ///
    /// `bot_username` is this bot's handle. A command suffixed with a
    /// different `@bot` is plain text. With no known handle every suffix
    /// is accepted.
    pub fn from_text(message_id: i64, text: String, bot_username: Option<&str>) -> Self {
        match parse_command(&text, bot_username) {
            Some((name, args)) => Self::Command {
                message_id,
                name,
                args,
                text,
            },
            None => Self::Text { message_id, text },
        }
    }
}

/// Split `/name@bot args` into `("name", "args")`.
fn parse_command(text: &str, bot_username: Option<&str>) -> Option<(String, String)> {
    let rest = text.strip_prefix('/')?;
    let (first, args) = match rest.split_once(char::is_whitespace) {
        Some((first, args)) => (first, args.trim()),
        None => (rest, ""),
    };
    let (name, target) = match first.split_once('@') {
        Some((name, target)) => (name, Some(target)),
        None => (first, None),
    };
    if name.is_empty() {
        return None;
    }
    if let (Some(target), Some(me)) = (target, bot_username) {
        if !target.eq_ignore_ascii_case(me) {
            return None;
        }
    }
    Some((name.to_string(), args.to_string()))
}

/// An outgoing message to send through a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub chat_id: i64,
    pub text: String,
    #[serde(default)]
    pub keyboard: Option<InlineKeyboard>,
}

impl OutgoingMessage {
    /// A plain text message with no buttons.
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            keyboard: None,
        }
    }

    /// Attach an inline keyboard.
    pub fn with_keyboard(mut self, keyboard: InlineKeyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_classification() {
        assert_eq!(
            EventKind::from_text(1, "/start".into(), None),
            EventKind::Command {
                message_id: 1,
                name: "start".into(),
                args: String::new(),
                text: "/start".into(),
            }
        );
        assert_eq!(
            EventKind::from_text(2, "/start@folio_bot  deep-link ".into(), Some("folio_bot")),
            EventKind::Command {
                message_id: 2,
                name: "start".into(),
                args: "deep-link".into(),
                text: "/start@folio_bot  deep-link ".into(),
            }
        );
    }

    #[test]
    fn test_command_for_other_bot_is_text() {
        assert_eq!(
            EventKind::from_text(5, "/start@other_bot".into(), Some("folio_bot")),
            EventKind::Text {
                message_id: 5,
                text: "/start@other_bot".into(),
            }
        );
        // Handle comparison ignores case.
        assert!(matches!(
            EventKind::from_text(6, "/start@Folio_Bot".into(), Some("folio_bot")),
            EventKind::Command { .. }
        ));
        // Unknown own handle: suffix accepted.
        assert!(matches!(
            EventKind::from_text(7, "/start@other_bot".into(), None),
            EventKind::Command { .. }
        ));
    }

    #[test]
    fn test_plain_text_classification() {
        assert_eq!(
            EventKind::from_text(3, "Hello /start".into(), None),
            EventKind::Text {
                message_id: 3,
                text: "Hello /start".into(),
            }
        );
        // A lone slash is not a command.
        assert!(matches!(
            EventKind::from_text(4, "/".into(), None),
            EventKind::Text { .. }
        ));
    }

    #[test]
    fn test_sender_handle() {
        let with_username = Sender {
            id: 1,
            username: Some("user".into()),
            display_name: "Some User".into(),
        };
        assert_eq!(with_username.handle(), "@user");

        let without = Sender {
            id: 42,
            username: None,
            display_name: "Li Lei".into(),
        };
        assert_eq!(without.handle(), "Li Lei (id 42)");
    }

    #[test]
    fn test_outgoing_builders() {
        let msg = OutgoingMessage::text(5, "hi").with_keyboard(vec![vec![InlineButton {
            text: "a".into(),
            callback_data: "b".into(),
        }]]);
        assert_eq!(msg.chat_id, 5);
        assert_eq!(msg.keyboard.as_ref().map(Vec::len), Some(1));
    }
}
