//! Admission control for inbound chat requests.
//!
//! Every request passes through [`AdmissionGate::validate_message`] before it
//! reaches command dispatch. The gate checks, in order:
//! 1. the chat allow-list (when one is configured),
//! 2. the requester's sliding-window rate limit,
//! 3. the message length.
//!
//! The gate owns its [`RateLimiter`]; there is no process-wide limiter state.

mod error;
mod gate;
mod rate_limiter;

pub use error::{AdmissionError, AdmissionResult};
pub use gate::{AdmissionGate, MAX_MESSAGE_CHARS};
pub use rate_limiter::{RateLimiter, SWEEP_THRESHOLD};
