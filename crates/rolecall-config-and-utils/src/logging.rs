//! Logging initialization for the bot.
//!
//! Thin wrapper over the observability crate that maps [`Config`] onto a
//! [`LogConfig`]: production writes JSON lines, everything else writes compact
//! text with full timestamps.

use crate::Config;
use observability::{LogConfig, LogFormat};

const SERVICE_NAME: &str = "rolecall";

/// Initialize the logging system from the bot configuration.
///
/// The level comes from `RUST_LOG` when set, otherwise from `config.log_level`.
///
/// ```ignore
/// init_logging(&config);
/// tracing::info!("Bot started");
/// ```
pub fn init_logging(config: &Config) {
    let format = if config.is_production() {
        LogFormat::Json
    } else {
        LogFormat::Text
    };

    observability::init_with_config(LogConfig {
        service_name: SERVICE_NAME.into(),
        default_level: level_name(parse_level(&config.log_level)).into(),
        format,
        log_path: config.log_file.clone(),
    });
}

/// Parse a log level string into a tracing Level. Unknown levels map to INFO.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.trim().to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}

fn level_name(level: tracing::Level) -> &'static str {
    match level {
        tracing::Level::TRACE => "trace",
        tracing::Level::DEBUG => "debug",
        tracing::Level::INFO => "info",
        tracing::Level::WARN => "warn",
        tracing::Level::ERROR => "error",
    }
}
