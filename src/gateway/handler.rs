//! Conversation handler: `/start` → language → portfolio → question → relay.

use super::Gateway;
use folio_core::{
    action::CallbackAction,
    catalog::{self, Lang},
    config::RelayFailurePolicy,
    error::FolioError,
    message::{
        EventKind, IncomingEvent, InlineButton, InlineKeyboard, MessageRef, OutgoingMessage,
    },
    session::ConvState,
};
use tracing::{debug, error, info, warn};

/// Shown on `/start`, before any language is known.
pub(super) const LANGUAGE_PROMPT: &str = "中文: 选择机器人语言:\nENG: Choose Lang in bot:";

impl Gateway {
    /// React to one incoming event.
    pub(super) async fn handle_event(&self, event: &IncomingEvent) -> Result<(), FolioError> {
        match &event.kind {
            EventKind::Command { name, .. } if name == "start" => self.on_start(event).await,
            // Any other command is ordinary text; it may be a pending question.
            EventKind::Command {
                message_id, text, ..
            } => self.on_text(event, *message_id, text).await,
            EventKind::Callback {
                callback_id,
                data,
                message,
            } => self.on_callback(event, callback_id, data, *message).await,
            EventKind::Text { message_id, text } => self.on_text(event, *message_id, text).await,
        }
    }

    /// `/start` shows the language choice and resets the session.
    async fn on_start(&self, event: &IncomingEvent) -> Result<(), FolioError> {
        let mut session = self.sessions.lock(event.sender.id).await;
        session.reset();

        let prompt = OutgoingMessage::text(event.chat_id, LANGUAGE_PROMPT)
            .with_keyboard(language_keyboard());
        session.prompt = Some(self.channel.send(prompt).await?);

        info!("user {} started a conversation", event.sender.id);
        Ok(())
    }

    async fn on_callback(
        &self,
        event: &IncomingEvent,
        callback_id: &str,
        data: &str,
        message: Option<MessageRef>,
    ) -> Result<(), FolioError> {
        // Acknowledge every press, recognized or not, so the client's
        // loading indicator stops.
        if let Err(e) = self.channel.answer_callback(callback_id).await {
            warn!("failed to answer callback {callback_id}: {e}");
        }

        let action = match CallbackAction::parse(data) {
            Ok(action) => action,
            Err(e) => {
                debug!("user {}: {e}", event.sender.id);
                return Ok(());
            }
        };

        let mut session = self.sessions.lock(event.sender.id).await;
        match action {
            CallbackAction::SelectLanguage(lang) => {
                session.set_language(Some(lang));
                session.set_state(ConvState::Idle);

                let text = self.catalog.resolve(lang, catalog::PORTFOLIO)?;
                let keyboard =
                    ask_question_keyboard(self.catalog.resolve(lang, catalog::ASK_QUESTION)?);
                match message {
                    Some(target) => {
                        self.channel.edit(target, text, Some(&keyboard)).await?;
                        session.prompt = Some(target);
                    }
                    None => {
                        let portfolio =
                            OutgoingMessage::text(event.chat_id, text).with_keyboard(keyboard);
                        session.prompt = Some(self.channel.send(portfolio).await?);
                    }
                }
                info!("user {} selected language {lang}", event.sender.id);
            }
            CallbackAction::AskQuestion => {
                let lang = session.lang();
                let text = self.catalog.resolve(lang, catalog::ASK_QUESTION_PROMPT)?;
                match message {
                    Some(target) => {
                        self.channel.edit(target, text, None).await?;
                        session.prompt = Some(target);
                    }
                    None => {
                        let sent = self
                            .channel
                            .send(OutgoingMessage::text(event.chat_id, text))
                            .await?;
                        session.prompt = Some(sent);
                    }
                }
                session.set_state(ConvState::AwaitingQuestion);
                debug!("user {} is writing a question", event.sender.id);
            }
        }
        Ok(())
    }

    /// A text message is only meaningful while a question is awaited.
    async fn on_text(
        &self,
        event: &IncomingEvent,
        message_id: i64,
        text: &str,
    ) -> Result<(), FolioError> {
        let mut session = self.sessions.lock(event.sender.id).await;
        if session.state != ConvState::AwaitingQuestion {
            debug!("ignoring text from idle user {}", event.sender.id);
            return Ok(());
        }

        let lang = session.lang();
        let key = match self.relay.relay(&event.sender.handle(), text).await {
            Ok(()) => catalog::MESSAGE_SENT,
            Err(e) => {
                error!("relay from user {} failed: {e}", event.sender.id);
                confirmation_key_on_failure(self.relay_policy)
            }
        };

        let prompt = session.prompt;
        session.clear();

        self.channel
            .delete(MessageRef {
                chat_id: event.chat_id,
                message_id,
            })
            .await?;

        let confirmation = self.catalog.resolve(lang, key)?;
        match prompt {
            Some(target) => self.channel.edit(target, confirmation, None).await?,
            None => {
                self.channel
                    .send(OutgoingMessage::text(event.chat_id, confirmation))
                    .await?;
            }
        }
        Ok(())
    }
}

fn confirmation_key_on_failure(policy: RelayFailurePolicy) -> &'static str {
    match policy {
        RelayFailurePolicy::Confirm => catalog::MESSAGE_SENT,
        RelayFailurePolicy::Report => catalog::MESSAGE_FAILED,
    }
}

/// One row with a flag button per supported language.
pub(super) fn language_keyboard() -> InlineKeyboard {
    vec![Lang::ALL
        .iter()
        .map(|lang| InlineButton {
            text: lang.flag().to_string(),
            callback_data: CallbackAction::SelectLanguage(*lang).payload(),
        })
        .collect()]
}

fn ask_question_keyboard(label: &str) -> InlineKeyboard {
    vec![vec![InlineButton {
        text: label.to_string(),
        callback_data: CallbackAction::AskQuestion.payload(),
    }]]
}
