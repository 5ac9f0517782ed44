//! Relay: forwards a visitor's question to the admin chat.

use folio_core::{error::FolioError, message::OutgoingMessage, traits::Channel};
use std::sync::Arc;
use tracing::info;

/// Sends finished questions to the single configured admin chat.
pub struct Relay {
    channel: Arc<dyn Channel>,
    admin_chat_id: i64,
}

impl Relay {
    pub fn new(channel: Arc<dyn Channel>, admin_chat_id: i64) -> Self {
        Self {
            channel,
            admin_chat_id,
        }
    }

    /// Deliver `text` from `from` to the admin. No retry; the platform's
    /// error comes back as [`FolioError::Delivery`].
    pub async fn relay(&self, from: &str, text: &str) -> Result<(), FolioError> {
        let notice = format_notice(from, text);
        self.channel
            .send(OutgoingMessage::text(self.admin_chat_id, notice))
            .await?;
        info!(
            "relayed question from {from} to admin chat {} ({} chars)",
            self.admin_chat_id,
            text.chars().count()
        );
        Ok(())
    }
}

/// The notification the admin sees: sender line, blank line, message line.
pub(super) fn format_notice(from: &str, text: &str) -> String {
    format!("发件人：{from}\n\n留言：{text}")
}
