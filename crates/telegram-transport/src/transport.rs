use crate::{InboundEvent, TelegramClient, TransportResult};
use async_trait::async_trait;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::trace;

/// Source of inbound events and sink for replies.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Wait for the next batch of events. An empty batch is normal.
    async fn next_events(&self) -> TransportResult<Vec<InboundEvent>>;

    /// Send one text message to a chat.
    async fn send(&self, chat_id: i64, text: &str) -> TransportResult<()>;
}

/// [`Transport`] over Bot API long polling.
///
/// Each successful poll acknowledges every update it returned, including
/// updates that carry nothing the bot acts on.
pub struct TelegramTransport {
    client: TelegramClient,
    poll_timeout_secs: u64,
    offset: AtomicI64,
}

impl TelegramTransport {
    pub fn new(client: TelegramClient, poll_timeout_secs: u64) -> Self {
        Self {
            client,
            poll_timeout_secs,
            offset: AtomicI64::new(0),
        }
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn next_events(&self) -> TransportResult<Vec<InboundEvent>> {
        let offset = self.offset.load(Ordering::SeqCst);
        let updates = self
            .client
            .get_updates(offset, self.poll_timeout_secs)
            .await?;

        if let Some(last) = updates.iter().map(|u| u.update_id).max() {
            self.offset.store(last + 1, Ordering::SeqCst);
        }

        let events = updates
            .iter()
            .filter_map(|update| {
                let event = update.message.as_ref().and_then(InboundEvent::from_message);
                if event.is_none() {
                    trace!(update_id = update.update_id, "Skipping update without actionable message");
                }
                event
            })
            .collect();
        Ok(events)
    }

    async fn send(&self, chat_id: i64, text: &str) -> TransportResult<()> {
        self.client.send_message(chat_id, text).await
    }
}
