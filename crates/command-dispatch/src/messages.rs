//! Reply texts.

use role_directory::DirectoryError;

pub const MSG_PONG: &str = "🏓 pong";
pub const MSG_UNAUTHORIZED: &str = "❌ You are not authorized to use this command.";
pub const MSG_PROVIDE_ROLE_NAME: &str = "❌ Please provide a role name.";
pub const MSG_NO_ROLES: &str = "📋 No roles found.";
pub const MSG_BOT_HEALTHY: &str = "🟢 Bot is running and healthy!";
pub const MSG_UNKNOWN_COMMAND: &str = "❌ Unknown command. Use /help to see available commands.";

pub const HELP_MESSAGE: &str = "🤖 **Telegram Role Bot Commands**

**General Commands:**
/ping - Test if the bot is working
/ping <rolename> - Ping all users in a role
/listroles - List all roles
/listmembers <rolename> - List members of a role
/help - Show this help message

**Admin Commands:**
/createrole <rolename> - Create a new role
/removerole <rolename> - Remove a role
/addtorole <rolename> <username> - Add a user to a role
/removefromrole <rolename> <username> - Remove a user from a role

**Role Mentions:**
@<rolename> - Ping all users in a role

**Examples:**
/ping developers
/createrole developers
/addtorole developers john_doe
@developers";

pub fn usage(syntax: &str) -> String {
    format!("❌ Usage: {syntax}")
}

pub fn success(text: &str) -> String {
    format!("✅ {text}")
}

pub fn info(text: &str) -> String {
    format!("📋 {text}")
}

pub fn error(err: &DirectoryError) -> String {
    error_reply(err.kind(), err)
}

/// One-line error reply tagged with a snake_case error kind.
pub fn error_reply(kind: &str, message: impl std::fmt::Display) -> String {
    format!("❌ Error ({kind}): {message}")
}

pub fn role_ping(role: &str, users: &[String]) -> String {
    format!("📢 Pinging role '{role}': {}", mentions(users))
}

pub fn role_mention(role: &str, users: &[String]) -> String {
    format!("Pinging role @{role}: {}", mentions(users))
}

pub fn no_users(role: &str) -> String {
    format!("No users found in role '{role}'")
}

pub fn members(role: &str, users: &[String]) -> String {
    format!("Users in role '{role}': {}", users.join(", "))
}

fn mentions(users: &[String]) -> String {
    users
        .iter()
        .map(|user| format!("@{user}"))
        .collect::<Vec<_>>()
        .join(" ")
}
