//! # Observability
//!
//! Centralized tracing setup for the Rolecall workspace.
//!
//! Services call [`init_with_config`] once at startup and use the standard
//! `tracing` macros everywhere else. They never decide where log lines end up:
//!
//! - [`LogFormat::Text`] writes compact, human-readable lines to stdout
//! - [`LogFormat::Json`] writes one JSON object per line to stdout
//! - `log_path` additionally appends JSON lines to a file
//!
//! ## Usage
//!
//! ```rust,ignore
//! observability::init_with_config(observability::LogConfig {
//!     service_name: "rolecall".into(),
//!     default_level: "debug".into(),
//!     format: observability::LogFormat::Json,
//!     ..Default::default()
//! });
//! tracing::info!("bot started");
//! ```

mod file;

use std::io;
use std::path::PathBuf;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

pub use file::{AppendFileWriter, FileWriterFactory};

/// Output encoding for stdout log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Compact human-readable lines with full timestamps.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name of the service, recorded in the startup line.
    pub service_name: String,

    /// Default log level filter (e.g., "debug", "info", "warn").
    /// Can be overridden by `RUST_LOG` environment variable.
    pub default_level: String,

    /// Stdout encoding.
    pub format: LogFormat,

    /// Optional file that receives a JSON copy of every line.
    pub log_path: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            format: LogFormat::Text,
            log_path: None,
        }
    }
}

/// Initialize logging with default settings for the given service.
pub fn init(service_name: &str) {
    init_with_config(LogConfig {
        service_name: service_name.into(),
        ..Default::default()
    });
}

/// Initialize logging with custom configuration.
///
/// Calling this more than once is harmless: later calls leave the first
/// subscriber in place.
pub fn init_with_config(config: LogConfig) {
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    let stdout_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_writer(io::stdout)
            .with_filter(env_filter(&config.default_level))
            .boxed(),
        LogFormat::Text => tracing_subscriber::fmt::layer()
            .compact()
            .with_target(true)
            .with_writer(io::stdout)
            .with_filter(env_filter(&config.default_level))
            .boxed(),
    };
    layers.push(stdout_layer);

    let mut file_error = None;
    if let Some(path) = &config.log_path {
        match AppendFileWriter::new(path) {
            Ok(writer) => layers.push(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(FileWriterFactory::new(writer))
                    .with_filter(env_filter(&config.default_level))
                    .boxed(),
            ),
            Err(e) => file_error = Some(e),
        }
    }

    if tracing_subscriber::registry().with(layers).try_init().is_err() {
        return;
    }

    if let (Some(path), Some(e)) = (&config.log_path, file_error) {
        tracing::warn!(path = %path.display(), error = %e, "log file unavailable, logging to stdout only");
    }

    tracing::info!(
        service = %config.service_name,
        format = ?config.format,
        "observability initialized"
    );
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}
