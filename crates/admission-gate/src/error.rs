//! Admission error types.

use thiserror::Error;

/// Reason a request was refused admission.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    #[error("chat {chat_id} is not allowed")]
    ChatNotAllowed { chat_id: i64 },

    #[error("rate limit exceeded for user {requester_id}")]
    RateLimited { requester_id: i64 },

    #[error("message too long: {length} characters (max {max})")]
    InvalidInput { length: usize, max: usize },
}

impl AdmissionError {
    /// Stable snake_case tag for rendering and logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ChatNotAllowed { .. } => "chat_not_allowed",
            Self::RateLimited { .. } => "rate_limited",
            Self::InvalidInput { .. } => "invalid_input",
        }
    }

    /// Whether the requester should get no reply at all.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::ChatNotAllowed { .. } | Self::RateLimited { .. })
    }
}

/// Result type alias using AdmissionError.
pub type AdmissionResult<T> = Result<T, AdmissionError>;
