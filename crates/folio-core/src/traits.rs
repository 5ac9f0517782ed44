use crate::{
    error::FolioError,
    message::{IncomingEvent, InlineKeyboard, MessageRef, OutgoingMessage},
};
use async_trait::async_trait;

/// Messaging channel trait, the boundary to the chat platform.
///
/// A channel turns platform updates into [`IncomingEvent`]s and performs
/// the outbound operations the conversation needs.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Start listening for incoming events.
    /// Returns a receiver that yields incoming events.
    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<IncomingEvent>, FolioError>;

    /// Send a message and return a reference to it.
    async fn send(&self, message: OutgoingMessage) -> Result<MessageRef, FolioError>;

    /// Replace the text (and buttons) of a message the bot sent earlier.
    /// `None` removes any buttons.
    async fn edit(
        &self,
        target: MessageRef,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), FolioError>;

    /// Delete a message.
    async fn delete(&self, target: MessageRef) -> Result<(), FolioError>;

    /// Acknowledge a button press so the client stops its loading indicator.
    async fn answer_callback(&self, _callback_id: &str) -> Result<(), FolioError> {
        Ok(())
    }

    /// Graceful shutdown.
    async fn stop(&self) -> Result<(), FolioError>;
}
