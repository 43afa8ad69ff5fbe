//! Transactional role directory.

use crate::{
    normalize_handle, normalize_role_name, queries, AsyncDatabase, DirectoryError,
    DirectoryResult, StorageError, User,
};
use async_trait::async_trait;
use rusqlite::TransactionBehavior;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Role membership store consumed by command dispatch and health probes.
///
/// Every name and handle is normalized before it reaches storage, and a value
/// that normalizes to the empty string fails with
/// [`DirectoryError::InvalidInput`].
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Create a role. Fails with `AlreadyExists` on a duplicate name.
    async fn create_role(&self, name: &str) -> DirectoryResult<()>;

    /// Remove a role together with all of its memberships.
    async fn remove_role(&self, name: &str) -> DirectoryResult<()>;

    /// Add a user to an existing role, creating the user on first reference.
    /// Adding an existing member is a no-op.
    async fn add_user_to_role(&self, role: &str, user: &str) -> DirectoryResult<()>;

    /// Remove a single membership edge.
    async fn remove_user_from_role(&self, role: &str, user: &str) -> DirectoryResult<()>;

    /// Member handles of a role, sorted. Unknown roles yield an empty list.
    async fn get_users_in_role(&self, role: &str) -> DirectoryResult<Vec<String>>;

    /// Every role name, sorted.
    async fn get_all_roles(&self) -> DirectoryResult<Vec<String>>;

    /// Liveness probe bounded by `timeout`.
    async fn ping(&self, timeout: Duration) -> DirectoryResult<()>;
}

/// SQLite-backed [`RoleStore`].
///
/// Clones share the same executor thread.
#[derive(Clone)]
pub struct RoleDirectory {
    db: AsyncDatabase,
    timeout: Duration,
}

impl RoleDirectory {
    /// Open (or create) the directory database at `path`.
    ///
    /// `timeout` bounds every individual store call.
    pub async fn open(path: &Path, timeout: Duration) -> DirectoryResult<Self> {
        let db = AsyncDatabase::open(path).await?;
        Ok(Self::new(db, timeout))
    }

    /// Open a private in-memory directory.
    pub async fn open_in_memory(timeout: Duration) -> DirectoryResult<Self> {
        let db = AsyncDatabase::open_in_memory().await?;
        Ok(Self::new(db, timeout))
    }

    pub fn new(db: AsyncDatabase, timeout: Duration) -> Self {
        Self { db, timeout }
    }

    /// Underlying executor.
    pub fn database(&self) -> &AsyncDatabase {
        &self.db
    }

    /// Look up a user by handle.
    pub async fn get_user(&self, handle: &str) -> DirectoryResult<Option<User>> {
        let handle = require("user handle", handle, normalize_handle(handle))?;
        self.run("get_user", self.timeout, move |conn| {
            queries::get_user(conn, &handle)
        })
        .await
    }

    /// Close the executor after queued work drains.
    pub async fn close(self) -> DirectoryResult<()> {
        self.db.close().await?;
        Ok(())
    }

    /// Run `f` on the executor thread, giving up after `timeout`.
    ///
    /// A timed-out call has no effect on the directory.
    async fn run<F, T>(&self, operation: &'static str, timeout: Duration, f: F) -> DirectoryResult<T>
    where
        F: FnOnce(&mut rusqlite::Connection) -> DirectoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let result = self.db.call_timeout(timeout, f).await;
        match &result {
            Err(DirectoryError::StorageFailure(StorageError::Timeout(_))) => {
                warn!(operation, ?timeout, "Directory call timed out");
            }
            Err(DirectoryError::StorageFailure(cause)) => {
                error!(operation, error = %cause, "Directory storage failure");
            }
            _ => {}
        }
        result
    }
}

#[async_trait]
impl RoleStore for RoleDirectory {
    async fn create_role(&self, name: &str) -> DirectoryResult<()> {
        let name = require("role name", name, normalize_role_name(name))?;
        let role = self
            .run("create_role", self.timeout, move |conn| {
                queries::insert_role(conn, &name)
            })
            .await?;
        info!(role = %role.name, role_id = role.id, "Role created");
        Ok(())
    }

    async fn remove_role(&self, name: &str) -> DirectoryResult<()> {
        let name = require("role name", name, normalize_role_name(name))?;
        let role = name.clone();
        let cascaded = self
            .run("remove_role", self.timeout, move |conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let existing = queries::get_role(&tx, &name)?
                    .ok_or_else(|| DirectoryError::RoleNotFound { role: name.clone() })?;
                let members = queries::count_role_members(&tx, existing.id)?;
                queries::delete_role(&tx, &name)?;
                tx.commit()?;
                Ok(members)
            })
            .await?;
        info!(role = %role, memberships = cascaded, "Role removed");
        Ok(())
    }

    async fn add_user_to_role(&self, role: &str, user: &str) -> DirectoryResult<()> {
        let role = require("role name", role, normalize_role_name(role))?;
        let user = require("user handle", user, normalize_handle(user))?;
        let (role_name, user_name) = (role.clone(), user.clone());

        // The role lookup, user upsert and edge insert share one IMMEDIATE
        // transaction. A missing role rolls back the upsert with it.
        let added = self
            .run("add_user_to_role", self.timeout, move |conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                let existing = queries::get_role(&tx, &role)?
                    .ok_or_else(|| DirectoryError::RoleNotFound { role: role.clone() })?;
                let user_id = queries::upsert_user(&tx, &user)?;
                let added = queries::insert_membership(&tx, existing.id, user_id)?;
                tx.commit()?;
                Ok(added)
            })
            .await?;

        if added {
            info!(role = %role_name, user = %user_name, "User added to role");
        } else {
            debug!(role = %role_name, user = %user_name, "User already in role");
        }
        Ok(())
    }

    async fn remove_user_from_role(&self, role: &str, user: &str) -> DirectoryResult<()> {
        let role = require("role name", role, normalize_role_name(role))?;
        let user = require("user handle", user, normalize_handle(user))?;
        let (role_name, user_name) = (role.clone(), user.clone());

        let removed = self
            .run("remove_user_from_role", self.timeout, move |conn| {
                queries::delete_membership(conn, &role, &user)
            })
            .await?;

        if !removed {
            return Err(DirectoryError::MembershipNotFound {
                role: role_name,
                user: user_name,
            });
        }
        info!(role = %role_name, user = %user_name, "User removed from role");
        Ok(())
    }

    async fn get_users_in_role(&self, role: &str) -> DirectoryResult<Vec<String>> {
        let role = require("role name", role, normalize_role_name(role))?;
        self.run("get_users_in_role", self.timeout, move |conn| {
            queries::list_role_members(conn, &role)
        })
        .await
    }

    async fn get_all_roles(&self) -> DirectoryResult<Vec<String>> {
        self.run("get_all_roles", self.timeout, |conn| {
            queries::list_role_names(conn)
        })
        .await
    }

    async fn ping(&self, timeout: Duration) -> DirectoryResult<()> {
        self.db.health_check(timeout).await.map_err(|e| {
            warn!(?timeout, error = %e, "Directory ping failed");
            DirectoryError::from(e)
        })
    }
}

fn require(field: &'static str, raw: &str, normalized: String) -> DirectoryResult<String> {
    if normalized.is_empty() {
        return Err(DirectoryError::InvalidInput {
            field,
            value: raw.to_string(),
            reason: "cannot be empty",
        });
    }
    Ok(normalized)
}
