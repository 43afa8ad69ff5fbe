use crate::messages;
use crate::{AuthLevel, Command};
use role_directory::{normalize_role_name, DirectoryError, RoleStore};
use std::sync::Arc;
use tracing::{debug, warn};

/// Stateless request router over a [`RoleStore`].
#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<dyn RoleStore>,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn RoleStore>) -> Self {
        Self { store }
    }

    /// Route an admitted command and render its reply.
    ///
    /// Admin-only commands from non-admins are refused before any store call,
    /// as are argument lists of the wrong arity.
    pub async fn dispatch(&self, command: &str, args: &str, level: AuthLevel) -> String {
        let Some(command) = Command::parse(command) else {
            debug!(command, "Unknown command");
            return messages::MSG_UNKNOWN_COMMAND.to_string();
        };

        if command.requires_admin() && level != AuthLevel::Admin {
            warn!(command = command.name(), "Unauthorized command attempt");
            return messages::MSG_UNAUTHORIZED.to_string();
        }

        let tokens: Vec<&str> = args.split_whitespace().collect();
        match command {
            Command::Ping => match tokens.as_slice() {
                [] => messages::MSG_PONG.to_string(),
                [role] => self.ping_role(role).await,
                _ => messages::usage(command.syntax()),
            },
            Command::CreateRole => match single_role(command, &tokens) {
                Ok(role) => self.create_role(role).await,
                Err(reply) => reply,
            },
            Command::RemoveRole => match single_role(command, &tokens) {
                Ok(role) => self.remove_role(role).await,
                Err(reply) => reply,
            },
            Command::AddToRole => match tokens.as_slice() {
                [role, user] => self.add_to_role(role, user).await,
                _ => messages::usage(command.syntax()),
            },
            Command::RemoveFromRole => match tokens.as_slice() {
                [role, user] => self.remove_from_role(role, user).await,
                _ => messages::usage(command.syntax()),
            },
            Command::ListRoles => self.list_roles().await,
            Command::ListMembers => match single_role(command, &tokens) {
                Ok(role) => self.list_members(role).await,
                Err(reply) => reply,
            },
            Command::Help => messages::HELP_MESSAGE.to_string(),
            Command::Status => messages::MSG_BOT_HEALTHY.to_string(),
        }
    }

    /// Reply to a plain `@role` message, or `None` when there is nothing to say.
    ///
    /// The role is the first token after `@`. A role with no members, or text
    /// that does not name a role, yields no reply.
    pub async fn mention(&self, text: &str) -> Option<String> {
        let role = text
            .trim_start()
            .strip_prefix('@')?
            .split_whitespace()
            .next()?;

        match self.store.get_users_in_role(role).await {
            Ok(users) if users.is_empty() => None,
            Ok(users) => Some(messages::role_mention(&normalize_role_name(role), &users)),
            Err(DirectoryError::InvalidInput { .. }) => None,
            Err(err) => Some(render_error(&err)),
        }
    }

    async fn ping_role(&self, role: &str) -> String {
        let role = normalize_role_name(role);
        match self.store.get_users_in_role(&role).await {
            Ok(users) if users.is_empty() => messages::no_users(&role),
            Ok(users) => messages::role_ping(&role, &users),
            Err(err) => render_error(&err),
        }
    }

    async fn create_role(&self, role: &str) -> String {
        match self.store.create_role(role).await {
            Ok(()) => messages::success(&format!(
                "Role '{}' created successfully",
                normalize_role_name(role)
            )),
            Err(err) => render_error(&err),
        }
    }

    async fn remove_role(&self, role: &str) -> String {
        match self.store.remove_role(role).await {
            Ok(()) => messages::success(&format!(
                "Role '{}' removed successfully",
                normalize_role_name(role)
            )),
            Err(err) => render_error(&err),
        }
    }

    async fn add_to_role(&self, role: &str, user: &str) -> String {
        match self.store.add_user_to_role(role, user).await {
            Ok(()) => messages::success(&format!(
                "User {user} added to role '{}'",
                normalize_role_name(role)
            )),
            Err(err) => render_error(&err),
        }
    }

    async fn remove_from_role(&self, role: &str, user: &str) -> String {
        match self.store.remove_user_from_role(role, user).await {
            Ok(()) => messages::success(&format!(
                "User {user} removed from role '{}'",
                normalize_role_name(role)
            )),
            Err(err) => render_error(&err),
        }
    }

    async fn list_roles(&self) -> String {
        match self.store.get_all_roles().await {
            Ok(roles) if roles.is_empty() => messages::MSG_NO_ROLES.to_string(),
            Ok(roles) => messages::info(&format!("Roles: {}", roles.join(", "))),
            Err(err) => render_error(&err),
        }
    }

    async fn list_members(&self, role: &str) -> String {
        let role = normalize_role_name(role);
        match self.store.get_users_in_role(&role).await {
            Ok(users) if users.is_empty() => messages::no_users(&role),
            Ok(users) => messages::members(&role, &users),
            Err(err) => render_error(&err),
        }
    }
}

fn single_role<'a>(command: Command, tokens: &[&'a str]) -> Result<&'a str, String> {
    match tokens {
        [] => Err(messages::MSG_PROVIDE_ROLE_NAME.to_string()),
        [role] => Ok(*role),
        _ => Err(messages::usage(command.syntax())),
    }
}

fn render_error(err: &DirectoryError) -> String {
    if let DirectoryError::StorageFailure(cause) = err {
        warn!(error = %cause, "Replying with storage failure");
    } else {
        debug!(kind = err.kind(), error = %err, "Directory rejected request");
    }
    messages::error(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use role_directory::{DirectoryResult, RoleDirectory, StorageError};
    use std::time::Duration;

    async fn dispatcher() -> Dispatcher {
        let dir = RoleDirectory::open_in_memory(Duration::from_secs(5))
            .await
            .unwrap();
        Dispatcher::new(Arc::new(dir))
    }

    struct BrokenStore;

    fn broken<T>() -> DirectoryResult<T> {
        Err(StorageError::Connection("disk on fire".into()).into())
    }

    #[async_trait]
    impl RoleStore for BrokenStore {
        async fn create_role(&self, _: &str) -> DirectoryResult<()> {
            broken()
        }
        async fn remove_role(&self, _: &str) -> DirectoryResult<()> {
            broken()
        }
        async fn add_user_to_role(&self, _: &str, _: &str) -> DirectoryResult<()> {
            broken()
        }
        async fn remove_user_from_role(&self, _: &str, _: &str) -> DirectoryResult<()> {
            broken()
        }
        async fn get_users_in_role(&self, _: &str) -> DirectoryResult<Vec<String>> {
            broken()
        }
        async fn get_all_roles(&self) -> DirectoryResult<Vec<String>> {
            broken()
        }
        async fn ping(&self, _: Duration) -> DirectoryResult<()> {
            broken()
        }
    }

    #[tokio::test]
    async fn test_membership_flow() {
        let d = dispatcher().await;
        let admin = AuthLevel::Admin;

        assert_eq!(
            d.dispatch("createrole", "Ops", admin).await,
            "✅ Role 'ops' created successfully"
        );
        assert_eq!(
            d.dispatch("addtorole", "ops @alice", admin).await,
            "✅ User @alice added to role 'ops'"
        );
        d.dispatch("addtorole", "ops  bob", admin).await;

        assert_eq!(
            d.dispatch("listmembers", "ops", AuthLevel::Member).await,
            "Users in role 'ops': alice, bob"
        );
        assert_eq!(
            d.dispatch("ping", "OPS", AuthLevel::Member).await,
            "📢 Pinging role 'ops': @alice @bob"
        );
        assert_eq!(
            d.dispatch("listroles", "", AuthLevel::Member).await,
            "📋 Roles: ops"
        );

        assert_eq!(
            d.dispatch("removefromrole", "ops alice", admin).await,
            "✅ User alice removed from role 'ops'"
        );
        assert_eq!(
            d.dispatch("removefromrole", "ops alice", admin).await,
            "❌ Error (not_found): user 'alice' not found in role 'ops'"
        );
        assert_eq!(
            d.dispatch("removerole", "ops", admin).await,
            "✅ Role 'ops' removed successfully"
        );
        assert_eq!(
            d.dispatch("listroles", "", AuthLevel::Member).await,
            messages::MSG_NO_ROLES
        );
    }

    #[tokio::test]
    async fn test_members_cannot_mutate() {
        let d = dispatcher().await;
        for command in ["createrole", "removerole", "addtorole", "removefromrole"] {
            assert_eq!(
                d.dispatch(command, "ops alice", AuthLevel::Member).await,
                messages::MSG_UNAUTHORIZED
            );
        }
        assert_eq!(
            d.dispatch("listroles", "", AuthLevel::Member).await,
            messages::MSG_NO_ROLES
        );
    }

    #[tokio::test]
    async fn test_arity_checked_before_store() {
        let d = Dispatcher::new(Arc::new(BrokenStore));
        let admin = AuthLevel::Admin;

        assert_eq!(
            d.dispatch("addtorole", "ops", admin).await,
            "❌ Usage: /addtorole <rolename> <username>"
        );
        assert_eq!(
            d.dispatch("removefromrole", "ops a b", admin).await,
            "❌ Usage: /removefromrole <rolename> <username>"
        );
        assert_eq!(
            d.dispatch("createrole", "  ", admin).await,
            messages::MSG_PROVIDE_ROLE_NAME
        );
        assert_eq!(
            d.dispatch("removerole", "two words", admin).await,
            "❌ Usage: /removerole <rolename>"
        );
        assert_eq!(
            d.dispatch("ping", "a b", AuthLevel::Member).await,
            "❌ Usage: /ping [rolename]"
        );
    }

    #[tokio::test]
    async fn test_static_replies() {
        let d = Dispatcher::new(Arc::new(BrokenStore));
        let member = AuthLevel::Member;
        assert_eq!(d.dispatch("ping", "", member).await, messages::MSG_PONG);
        assert_eq!(d.dispatch("help", "", member).await, messages::HELP_MESSAGE);
        assert_eq!(d.dispatch("status", "", member).await, messages::MSG_BOT_HEALTHY);
        assert_eq!(
            d.dispatch("frobnicate", "", member).await,
            messages::MSG_UNKNOWN_COMMAND
        );
    }

    #[tokio::test]
    async fn test_storage_failure_is_rendered() {
        let d = Dispatcher::new(Arc::new(BrokenStore));
        assert_eq!(
            d.dispatch("listroles", "", AuthLevel::Member).await,
            "❌ Error (storage_failure): storage failure"
        );
        assert_eq!(
            d.mention("@ops").await.as_deref(),
            Some("❌ Error (storage_failure): storage failure")
        );
    }

    #[tokio::test]
    async fn test_duplicate_and_missing_roles() {
        let d = dispatcher().await;
        let admin = AuthLevel::Admin;
        d.dispatch("createrole", "ops", admin).await;
        assert_eq!(
            d.dispatch("createrole", "OPS", admin).await,
            "❌ Error (already_exists): role 'ops' already exists"
        );
        assert_eq!(
            d.dispatch("addtorole", "dev carol", admin).await,
            "❌ Error (not_found): role 'dev' not found"
        );
        assert_eq!(
            d.dispatch("ping", "dev", AuthLevel::Member).await,
            "No users found in role 'dev'"
        );
    }

    #[tokio::test]
    async fn test_mentions() {
        let d = dispatcher().await;
        d.dispatch("createrole", "ops", AuthLevel::Admin).await;
        d.dispatch("createrole", "empty", AuthLevel::Admin).await;
        d.dispatch("addtorole", "ops alice", AuthLevel::Admin).await;

        assert_eq!(
            d.mention("@Ops can someone look at this?").await.as_deref(),
            Some("Pinging role @ops: @alice")
        );
        assert_eq!(d.mention("@empty").await, None);
        assert_eq!(d.mention("@nobody hello").await, None);
        assert_eq!(d.mention("@").await, None);
        assert_eq!(d.mention("ops").await, None);
    }
}
