use crate::{AdmissionError, AdmissionResult, RateLimiter};
use std::collections::HashSet;
use std::time::Instant;
use tracing::warn;

/// Longest accepted message, in characters after trimming.
pub const MAX_MESSAGE_CHARS: usize = 4000;

/// Allow-list, rate-limit and privilege checks for inbound requests.
#[derive(Debug)]
pub struct AdmissionGate {
    limiter: RateLimiter,
    allowed_chats: HashSet<i64>,
    admin: String,
}

impl AdmissionGate {
    /// An empty `allowed_chats` admits every chat.
    pub fn new(
        limiter: RateLimiter,
        allowed_chats: impl IntoIterator<Item = i64>,
        admin: impl Into<String>,
    ) -> Self {
        Self {
            limiter,
            allowed_chats: allowed_chats.into_iter().collect(),
            admin: admin.into(),
        }
    }

    pub fn validate_message(&self, requester_id: i64, chat_id: i64, text: &str) -> AdmissionResult<()> {
        self.validate_message_at(requester_id, chat_id, text, Instant::now())
    }

    /// Run every admission check as of `now`.
    ///
    /// A request refused by the allow-list never consumes a rate-limit slot. A
    /// request that passes the rate limit has consumed one even if it then
    /// fails the length check.
    pub fn validate_message_at(
        &self,
        requester_id: i64,
        chat_id: i64,
        text: &str,
        now: Instant,
    ) -> AdmissionResult<()> {
        if !self.allowed_chats.is_empty() && !self.allowed_chats.contains(&chat_id) {
            warn!(chat_id, requester_id, "Rejected message from chat outside allow-list");
            return Err(AdmissionError::ChatNotAllowed { chat_id });
        }

        if !self.limiter.check_at(requester_id, now) {
            warn!(requester_id, chat_id, "Rate limit exceeded");
            return Err(AdmissionError::RateLimited { requester_id });
        }

        let length = text.trim().chars().count();
        if length > MAX_MESSAGE_CHARS {
            warn!(requester_id, chat_id, length, "Rejected oversized message");
            return Err(AdmissionError::InvalidInput {
                length,
                max: MAX_MESSAGE_CHARS,
            });
        }

        Ok(())
    }

    /// Whether `identity` is the configured admin.
    pub fn is_admin(&self, identity: &str) -> bool {
        identity == self.admin
    }
}
