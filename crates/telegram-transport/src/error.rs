//! Transport error types.

use thiserror::Error;

/// Errors talking to the Bot API.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Network or protocol failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The token was rejected
    #[error("invalid bot token")]
    InvalidToken,

    /// The API answered with `ok: false`
    #[error("Bot API error {status}: {description}")]
    Api { status: u16, description: String },

    /// Malformed response body
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TransportError {
    /// Stable snake_case tag for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Http(_) => "http",
            Self::InvalidToken => "invalid_token",
            Self::Api { .. } => "api",
            Self::Json(_) => "json",
        }
    }

    /// Whether the same request may succeed later.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => !e.is_builder(),
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidToken | Self::Json(_) => false,
        }
    }
}

/// Result type alias using TransportError.
pub type TransportResult<T> = Result<T, TransportError>;
