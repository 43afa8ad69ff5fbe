//! Telegram Bot API transport.
//!
//! - [`TelegramClient`]: thin reqwest client for `getMe`, `getUpdates` and
//!   `sendMessage`, with retries on sends
//! - [`InboundEvent`]: a chat message reduced to what the bot acts on
//! - [`Transport`]: the seam the event loop consumes, implemented by
//!   [`TelegramTransport`] over long polling

mod client;
mod error;
mod event;
mod transport;
pub mod types;

pub use client::{TelegramClient, DEFAULT_API_URL};
pub use error::{TransportError, TransportResult};
pub use event::{parse_command, CommandCall, InboundEvent};
pub use transport::{TelegramTransport, Transport};
