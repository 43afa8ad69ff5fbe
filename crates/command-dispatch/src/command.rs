/// Privilege of the requester, decided before dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthLevel {
    Admin,
    Member,
}

/// Commands the bot answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    CreateRole,
    RemoveRole,
    AddToRole,
    RemoveFromRole,
    ListRoles,
    ListMembers,
    Help,
    Status,
}

impl Command {
    /// Parse a command name, already stripped of `/` and lower-cased.
    pub fn parse(name: &str) -> Option<Self> {
        let command = match name {
            "ping" => Self::Ping,
            "createrole" => Self::CreateRole,
            "removerole" => Self::RemoveRole,
            "addtorole" => Self::AddToRole,
            "removefromrole" => Self::RemoveFromRole,
            "listroles" => Self::ListRoles,
            "listmembers" => Self::ListMembers,
            "help" => Self::Help,
            "status" => Self::Status,
            _ => return None,
        };
        Some(command)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::CreateRole => "createrole",
            Self::RemoveRole => "removerole",
            Self::AddToRole => "addtorole",
            Self::RemoveFromRole => "removefromrole",
            Self::ListRoles => "listroles",
            Self::ListMembers => "listmembers",
            Self::Help => "help",
            Self::Status => "status",
        }
    }

    /// Whether only the admin may run this command.
    pub fn requires_admin(self) -> bool {
        matches!(
            self,
            Self::CreateRole | Self::RemoveRole | Self::AddToRole | Self::RemoveFromRole
        )
    }

    /// Argument syntax shown in usage replies.
    pub fn syntax(self) -> &'static str {
        match self {
            Self::Ping => "/ping [rolename]",
            Self::CreateRole => "/createrole <rolename>",
            Self::RemoveRole => "/removerole <rolename>",
            Self::AddToRole => "/addtorole <rolename> <username>",
            Self::RemoveFromRole => "/removefromrole <rolename> <username>",
            Self::ListRoles => "/listroles",
            Self::ListMembers => "/listmembers <rolename>",
            Self::Help => "/help",
            Self::Status => "/status",
        }
    }
}
