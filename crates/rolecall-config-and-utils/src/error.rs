//! Core error types for configuration loading.

use thiserror::Error;

/// Core error type for bootstrap operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A required environment variable is missing or empty
    #[error("{0} is required")]
    MissingVar(&'static str),

    /// A value is present but unusable
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
