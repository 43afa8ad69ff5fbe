//! Directory error types.

use std::time::Duration;
use thiserror::Error;

/// Low-level storage fault.
#[derive(Error, Debug)]
pub enum StorageError {
    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Executor thread or connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The call did not finish within its deadline
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

/// Result type alias using StorageError.
pub type StorageResult<T> = Result<T, StorageError>;

/// Domain error returned by every directory operation.
#[derive(Error, Debug)]
pub enum DirectoryError {
    /// Empty or malformed name after normalization
    #[error("invalid {field} '{value}': {reason}")]
    InvalidInput {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    /// No role with that name
    #[error("role '{role}' not found")]
    RoleNotFound { role: String },

    /// No membership edge for the pair
    #[error("user '{user}' not found in role '{role}'")]
    MembershipNotFound { role: String, user: String },

    /// Duplicate role creation
    #[error("role '{role}' already exists")]
    AlreadyExists { role: String },

    /// Underlying storage fault. The cause is kept as the error source.
    #[error("storage failure")]
    StorageFailure(#[source] StorageError),
}

impl DirectoryError {
    /// Stable snake_case tag for rendering and logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_input",
            Self::RoleNotFound { .. } | Self::MembershipNotFound { .. } => "not_found",
            Self::AlreadyExists { .. } => "already_exists",
            Self::StorageFailure(_) => "storage_failure",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::RoleNotFound { .. } | Self::MembershipNotFound { .. }
        )
    }
}

impl From<StorageError> for DirectoryError {
    fn from(e: StorageError) -> Self {
        Self::StorageFailure(e)
    }
}

impl From<rusqlite::Error> for DirectoryError {
    fn from(e: rusqlite::Error) -> Self {
        Self::StorageFailure(StorageError::Sqlite(e))
    }
}

/// Result type alias using DirectoryError.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        let invalid = DirectoryError::InvalidInput {
            field: "role name",
            value: String::new(),
            reason: "cannot be empty",
        };
        assert_eq!(invalid.kind(), "invalid_input");
        assert_eq!(invalid.to_string(), "invalid role name '': cannot be empty");

        let missing = DirectoryError::MembershipNotFound {
            role: "ops".into(),
            user: "alice".into(),
        };
        assert_eq!(missing.kind(), "not_found");
        assert!(missing.is_not_found());
        assert_eq!(missing.to_string(), "user 'alice' not found in role 'ops'");
    }

    #[test]
    fn storage_failure_hides_cause_in_display() {
        let err = DirectoryError::from(StorageError::Connection("thread gone".into()));
        assert_eq!(err.kind(), "storage_failure");
        assert_eq!(err.to_string(), "storage failure");
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("Connection error: thread gone"));
    }
}
