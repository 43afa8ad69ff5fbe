//! Bot API HTTP client.

use crate::types::{ApiResponse, GetUpdatesRequest, SendMessageRequest, Update, User};
use crate::{TransportError, TransportResult};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Public Bot API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

const DEFAULT_RETRY_BASE: Duration = Duration::from_millis(500);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);
// Slack on top of the long-poll timeout before the HTTP request itself gives up.
const POLL_GRACE: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Telegram Bot API client.
#[derive(Clone)]
pub struct TelegramClient {
    http_client: reqwest::Client,
    api_url: String,
    token: String,
    max_retries: u32,
    retry_base: Duration,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("api_url", &self.api_url)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl TelegramClient {
    /// Create a client for the public Bot API.
    ///
    /// `max_retries` applies to `sendMessage` only.
    pub fn new(token: impl Into<String>, max_retries: u32) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_url: DEFAULT_API_URL.to_string(),
            token: token.into(),
            max_retries,
            retry_base: DEFAULT_RETRY_BASE,
        }
    }

    /// Point the client at another API root.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Base delay for send retries; doubles on every attempt.
    pub fn with_retry_base(mut self, retry_base: Duration) -> Self {
        self.retry_base = retry_base;
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }

    /// Check the token and return the bot's own account.
    pub async fn get_me(&self) -> TransportResult<User> {
        self.post::<User, _>("getMe", &serde_json::json!({}), REQUEST_TIMEOUT)
            .await
            .map_err(|(err, _)| err)
    }

    /// Long-poll for updates with ids at or above `offset`.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> TransportResult<Vec<Update>> {
        let request = GetUpdatesRequest {
            offset,
            timeout: timeout_secs,
            allowed_updates: &["message"],
        };
        let updates: Vec<Update> = self
            .post(
                "getUpdates",
                &request,
                Duration::from_secs(timeout_secs) + POLL_GRACE,
            )
            .await
            .map_err(|(err, _)| err)?;
        debug!(offset, count = updates.len(), "Fetched updates");
        Ok(updates)
    }

    /// Send a text message, retrying transient failures with exponential backoff.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> TransportResult<()> {
        let request = SendMessageRequest { chat_id, text };
        let mut attempt = 0;

        loop {
            match self
                .post::<serde_json::Value, _>("sendMessage", &request, REQUEST_TIMEOUT)
                .await
            {
                Ok(_) => return Ok(()),
                Err((err, _)) if attempt >= self.max_retries || !err.is_retryable() => {
                    return Err(err);
                }
                Err((err, retry_after)) => {
                    let delay = self.retry_delay(attempt, retry_after);
                    attempt += 1;
                    warn!(
                        chat_id,
                        attempt,
                        max_retries = self.max_retries,
                        ?delay,
                        error = %err,
                        "sendMessage failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Delay before the next send attempt. A server hint wins but is capped.
    fn retry_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        match retry_after {
            Some(hint) => hint.min(MAX_RETRY_DELAY),
            None => self.backoff(attempt),
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.retry_base
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(MAX_RETRY_DELAY)
    }

    /// POST a JSON body and unwrap the Bot API envelope. Errors carry the
    /// server's `retry_after` hint when there is one.
    async fn post<T, B>(
        &self,
        method: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<T, (TransportError, Option<Duration>)>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self
            .http_client
            .post(self.method_url(method))
            .json(body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| (TransportError::from(e), None))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::NOT_FOUND {
            return Err((TransportError::InvalidToken, None));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| (TransportError::from(e), None))?;
        let envelope: ApiResponse<T> =
            serde_json::from_slice(&bytes).map_err(|e| {
                if status.is_success() {
                    (TransportError::from(e), None)
                } else {
                    (
                        TransportError::Api {
                            status: status.as_u16(),
                            description: status.to_string(),
                        },
                        None,
                    )
                }
            })?;

        match (envelope.ok, envelope.result) {
            (true, Some(result)) => Ok(result),
            _ => {
                let retry_after = envelope
                    .parameters
                    .and_then(|p| p.retry_after)
                    .map(Duration::from_secs);
                Err((
                    TransportError::Api {
                        status: envelope.error_code.unwrap_or(status.as_u16()),
                        description: envelope
                            .description
                            .unwrap_or_else(|| "missing result".to_string()),
                    },
                    retry_after,
                ))
            }
        }
    }
}
