//! Inbound event handling and the polling loop.

use super::backoff::PollBackoff;
use admission_gate::AdmissionGate;
use command_dispatch::{messages, AuthLevel, Dispatcher};
use telegram_transport::{InboundEvent, Transport};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Admission plus dispatch for one bot instance.
pub(crate) struct BotService {
    gate: AdmissionGate,
    dispatcher: Dispatcher,
}

impl BotService {
    pub(crate) fn new(gate: AdmissionGate, dispatcher: Dispatcher) -> Self {
        Self { gate, dispatcher }
    }

    /// Produce the reply for one event, if any.
    pub(crate) async fn handle_event(&self, event: &InboundEvent) -> Option<String> {
        debug!(
            requester_id = event.requester_id,
            username = %event.requester_handle,
            chat_id = event.chat_id,
            message_id = event.message_id,
            text = %event.text,
            "Received message"
        );

        if let Err(e) = self
            .gate
            .validate_message(event.requester_id, event.chat_id, &event.text)
        {
            if e.is_silent() {
                return None;
            }
            return Some(messages::error_reply(e.kind(), &e));
        }

        let level = if self.gate.is_admin(&event.requester_handle) {
            AuthLevel::Admin
        } else {
            AuthLevel::Member
        };

        if let Some(command) = &event.command {
            return Some(
                self.dispatcher
                    .dispatch(&command.name, &command.args, level)
                    .await,
            );
        }

        if event.text.trim_start().starts_with('@') {
            return self.dispatcher.mention(&event.text).await;
        }

        None
    }

    /// Poll, handle and reply until `shutdown` flips to true.
    pub(crate) async fn run(&self, transport: &dyn Transport, mut shutdown: watch::Receiver<bool>) {
        let mut backoff = PollBackoff::default();
        info!("Bot started, listening for updates");

        'poll: loop {
            if *shutdown.borrow() {
                break;
            }

            let polled = tokio::select! {
                _ = shutdown.changed() => {
                    info!("Shutdown requested, stopping bot");
                    break;
                }
                polled = transport.next_events() => polled,
            };

            let events = match polled {
                Ok(events) => {
                    if backoff.failures > 0 {
                        info!(previous_failures = backoff.failures, "Update polling recovered");
                    }
                    backoff.reset();
                    events
                }
                Err(e) => {
                    let delay = backoff.next_delay();
                    warn!(
                        error = %e,
                        kind = e.kind(),
                        failure_count = backoff.failures,
                        next_poll_ms = delay.as_millis() as u64,
                        "Failed to fetch updates; backing off"
                    );
                    let stop = tokio::select! {
                        _ = shutdown.changed() => true,
                        _ = tokio::time::sleep(delay) => false,
                    };
                    if stop {
                        break;
                    }
                    continue;
                }
            };

            for event in events {
                tokio::select! {
                    _ = shutdown.changed() => {
                        info!(chat_id = event.chat_id, "Shutdown requested while handling update");
                        break 'poll;
                    }
                    _ = self.reply(transport, &event) => {}
                }
            }
        }

        debug!("Event loop stopped");
    }

    async fn reply(&self, transport: &dyn Transport, event: &InboundEvent) {
        let Some(reply) = self.handle_event(event).await else {
            return;
        };
        if let Err(e) = transport.send(event.chat_id, &reply).await {
            error!(chat_id = event.chat_id, error = %e, "Failed to handle update");
        }
    }
}
