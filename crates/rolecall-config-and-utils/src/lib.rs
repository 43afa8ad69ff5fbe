//! Configuration, error types, and logging setup shared by the Rolecall crates.

mod config;
mod error;
mod logging;

pub use config::{
    Config, DEFAULT_DATABASE_PATH, DEFAULT_DATABASE_TIMEOUT_SECS, DEFAULT_HEALTH_PORT,
    DEFAULT_LOG_LEVEL, DEFAULT_MAX_RETRIES, DEFAULT_RATE_LIMIT_PER_MIN, DEFAULT_UPDATE_TIMEOUT,
    ENV_PRODUCTION,
};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, parse_level};
