//! Directory model types.

use chrono::{DateTime, Utc};

/// A named group of users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A user known to the directory, created on first membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    /// Numeric chat-platform id, when known.
    pub telegram_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}
