//! Gateway: the event loop connecting the channel, sessions and texts.
//!
//! Every user gets a worker task that handles their events one at a time,
//! in arrival order. Workers for different users run concurrently and exit
//! after a quiet period; the next event respawns them. An exiting worker
//! also drops its user's session if no language was ever chosen.

mod handler;
mod relay;


use folio_core::{
    catalog::TextCatalog,
    config::{GatewayConfig, RelayFailurePolicy},
    message::IncomingEvent,
    session::SessionStore,
    traits::Channel,
};
use relay::Relay;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info};

/// The central gateway that routes channel events through the conversation.
pub struct Gateway {
    pub(super) channel: Arc<dyn Channel>,
    pub(super) sessions: SessionStore,
    pub(super) catalog: TextCatalog,
    pub(super) relay: Relay,
    pub(super) relay_policy: RelayFailurePolicy,
    /// How long a per-user worker waits for more events before exiting.
    pub(super) worker_idle: Duration,
    /// Queue into each live per-user worker.
    workers: Mutex<HashMap<i64, mpsc::UnboundedSender<IncomingEvent>>>,
}

impl Gateway {
    /// Create a new gateway.
    pub fn new(
        channel: Arc<dyn Channel>,
        catalog: TextCatalog,
        admin_chat_id: i64,
        relay_policy: RelayFailurePolicy,
        gateway_config: &GatewayConfig,
    ) -> Self {
        let relay = Relay::new(Arc::clone(&channel), admin_chat_id);
        Self {
            channel,
            sessions: SessionStore::new(),
            catalog,
            relay,
            relay_policy,
            worker_idle: Duration::from_secs(gateway_config.worker_idle_secs.max(1)),
            workers: Mutex::new(HashMap::new()),
        }
    }

    /// Run the main event loop until the channel closes or Ctrl-C.
    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        info!(
            "Folio gateway running | channel: {} | relay failures: {:?}",
            self.channel.name(),
            self.relay_policy,
        );

        let mut rx = self
            .channel
            .start()
            .await
            .map_err(|e| anyhow::anyhow!("failed to start channel {}: {e}", self.channel.name()))?;

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                event = rx.recv() => match event {
                    Some(event) => self.dispatch(event).await,
                    None => {
                        info!("channel closed, stopping gateway");
                        break;
                    }
                },
                _ = &mut shutdown => {
                    info!("received Ctrl-C, shutting down");
                    break;
                }
            }
        }

        self.channel.stop().await?;
        info!("Folio gateway stopped | sessions: {}", self.sessions.len().await);
        Ok(())
    }

    /// Hand an event to its user's worker, spawning one if needed.
    pub(super) async fn dispatch(self: &Arc<Self>, event: IncomingEvent) {
        let user_id = event.sender.id;
        let mut workers = self.workers.lock().await;

        let event = match workers.get(&user_id) {
            Some(tx) => match tx.send(event) {
                Ok(()) => return,
                // Worker task is gone (it panicked); start a fresh one.
                Err(mpsc::error::SendError(event)) => event,
            },
            None => event,
        };

        let (tx, rx) = mpsc::unbounded_channel();
        // The receiver is alive, so this cannot fail.
        let _ = tx.send(event);
        workers.insert(user_id, tx);

        let gw = Arc::clone(self);
        tokio::spawn(async move { gw.worker(user_id, rx).await });
    }

    /// Drain one user's queue sequentially until it stays empty for
    /// `worker_idle`.
    async fn worker(self: Arc<Self>, user_id: i64, mut rx: mpsc::UnboundedReceiver<IncomingEvent>) {
        loop {
            let event = match tokio::time::timeout(self.worker_idle, rx.recv()).await {
                Ok(Some(event)) => event,
                Ok(None) => break,
                Err(_) => {
                    // Deregister under the map lock so no event can be queued
                    // between the last check and the exit.
                    let mut workers = self.workers.lock().await;
                    match rx.try_recv() {
                        Ok(event) => event,
                        Err(_) => {
                            workers.remove(&user_id);
                            if self.sessions.evict_if_blank(user_id).await {
                                debug!("dropped blank session of user {user_id}");
                            }
                            debug!("worker for user {user_id} idle, exiting");
                            return;
                        }
                    }
                }
            };
            self.process(event).await;
        }
    }

    /// Handle one event; a failure aborts only this event.
    async fn process(&self, event: IncomingEvent) {
        if let Err(e) = self.handle_event(&event).await {
            error!(
                event = %event.id,
                "event from user {} in chat {} aborted: {e}",
                event.sender.id,
                event.chat_id
            );
        }
    }
}
