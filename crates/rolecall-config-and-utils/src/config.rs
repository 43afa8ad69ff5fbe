//! Configuration loaded from environment variables.

use crate::{CoreError, CoreResult};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default SQLite database file.
pub const DEFAULT_DATABASE_PATH: &str = "bot.db";
/// Default per-call storage timeout.
pub const DEFAULT_DATABASE_TIMEOUT_SECS: u64 = 5;
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Default number of retries for outbound sends.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default long-poll timeout in seconds.
pub const DEFAULT_UPDATE_TIMEOUT: u64 = 60;
/// Default requests per requester per minute.
pub const DEFAULT_RATE_LIMIT_PER_MIN: u32 = 30;
/// Default health server port.
pub const DEFAULT_HEALTH_PORT: u16 = 8080;
/// `ENV` value that switches on production behavior.
pub const ENV_PRODUCTION: &str = "production";

const DEFAULT_ENV: &str = "development";

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram Bot API token.
    pub telegram_token: String,
    /// Handle allowed to run privileged commands, without a leading `@`.
    pub admin_username: String,
    /// SQLite database file.
    pub database_path: PathBuf,
    /// Upper bound for a single storage call.
    pub database_timeout: Duration,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Optional JSONL log file.
    pub log_file: Option<PathBuf>,
    /// Deployment environment (`development`, `production`).
    pub env: String,
    /// Retries for outbound message sends.
    pub max_retries: u32,
    /// Long-poll timeout for update fetching, in seconds.
    pub update_timeout: u64,
    /// Chats the bot answers in. Empty means every chat.
    pub allowed_chats: Vec<i64>,
    /// Requests admitted per requester per minute.
    pub rate_limit_per_min: u32,
    /// Port of the health HTTP server.
    pub health_port: u16,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> CoreResult<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit set of variables.
    pub fn from_vars<I, K, V>(vars: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let lookup = |key: &str| {
            vars.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let telegram_token =
            lookup("TELEGRAM_APITOKEN").ok_or(CoreError::MissingVar("TELEGRAM_APITOKEN"))?;
        let admin_username = lookup("ADMIN_USERNAME")
            .map(|name| name.trim_start_matches('@').to_string())
            .filter(|name| !name.is_empty())
            .ok_or(CoreError::MissingVar("ADMIN_USERNAME"))?;

        let rate_limit_per_min =
            parse_or_default(lookup("RATE_LIMIT_PER_MIN"), DEFAULT_RATE_LIMIT_PER_MIN);
        if rate_limit_per_min == 0 {
            return Err(CoreError::Config(
                "RATE_LIMIT_PER_MIN must be a positive integer".to_string(),
            ));
        }

        let allowed_chats = lookup("ALLOWED_CHATS")
            .map(|raw| parse_chat_list(&raw))
            .unwrap_or_default();

        Ok(Self {
            telegram_token,
            admin_username,
            database_path: lookup("DATABASE_PATH")
                .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string())
                .into(),
            database_timeout: Duration::from_secs(
                parse_or_default(lookup("DATABASE_TIMEOUT_SECS"), DEFAULT_DATABASE_TIMEOUT_SECS)
                    .max(1),
            ),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_file: lookup("LOG_FILE").map(PathBuf::from),
            env: lookup("ENV").unwrap_or_else(|| DEFAULT_ENV.to_string()),
            max_retries: parse_or_default(lookup("MAX_RETRIES"), DEFAULT_MAX_RETRIES),
            update_timeout: parse_or_default(lookup("UPDATE_TIMEOUT"), DEFAULT_UPDATE_TIMEOUT),
            allowed_chats,
            rate_limit_per_min,
            health_port: parse_or_default(lookup("HEALTH_PORT"), DEFAULT_HEALTH_PORT),
        })
    }

    /// Whether the bot runs in production mode.
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case(ENV_PRODUCTION)
    }
}

fn parse_or_default<T: FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|value| value.parse().ok()).unwrap_or(default)
}

/// Parse a comma-separated chat id list, skipping entries that are not integers.
fn parse_chat_list(raw: &str) -> Vec<i64> {
    raw.split(',')
        .filter_map(|chat| chat.trim().parse::<i64>().ok())
        .collect()
}
