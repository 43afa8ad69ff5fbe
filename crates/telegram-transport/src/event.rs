use crate::types::Message;

/// A parsed `/command args` message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandCall {
    /// Lower-cased name without `/` or `@botname`.
    pub name: String,
    /// Everything after the command token, trimmed.
    pub args: String,
}

/// An inbound chat message the bot may act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub requester_id: i64,
    /// Sender's username without `@`; empty when the sender has none.
    pub requester_handle: String,
    pub chat_id: i64,
    pub message_id: i64,
    pub text: String,
    pub command: Option<CommandCall>,
}

impl InboundEvent {
    /// Build an event from a Bot API message. Messages without a sender or
    /// text are dropped.
    pub fn from_message(message: &Message) -> Option<Self> {
        let from = message.from.as_ref()?;
        let text = message.text.as_ref()?;

        Some(Self {
            requester_id: from.id,
            requester_handle: from.username.clone().unwrap_or_default(),
            chat_id: message.chat.id,
            message_id: message.message_id,
            text: text.clone(),
            command: parse_command(text),
        })
    }
}

/// Split `/name@bot args` into a [`CommandCall`]. Returns `None` for text that
/// is not a command.
pub fn parse_command(text: &str) -> Option<CommandCall> {
    let rest = text.strip_prefix('/')?;
    let (token, args) = match rest.find(char::is_whitespace) {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, ""),
    };

    let name = token.split('@').next().unwrap_or_default();
    if name.is_empty() {
        return None;
    }

    Some(CommandCall {
        name: name.to_lowercase(),
        args: args.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Chat, User};

    fn message(text: Option<&str>, username: Option<&str>) -> Message {
        Message {
            message_id: 10,
            from: Some(User {
                id: 77,
                is_bot: false,
                first_name: "Alice".to_string(),
                username: username.map(str::to_string),
            }),
            chat: Chat {
                id: -100,
                kind: "group".to_string(),
            },
            text: text.map(str::to_string),
        }
    }

    #[test]
    fn parses_command_with_bot_suffix() {
        let call = parse_command("/AddToRole@RoleBot  ops   alice ").unwrap();
        assert_eq!(call.name, "addtorole");
        assert_eq!(call.args, "ops   alice");
    }

    #[test]
    fn bare_command_has_empty_args() {
        let call = parse_command("/ping").unwrap();
        assert_eq!(call.name, "ping");
        assert_eq!(call.args, "");
    }

    #[test]
    fn non_commands_are_none() {
        assert_eq!(parse_command("hello /ping"), None);
        assert_eq!(parse_command("@ops"), None);
        assert_eq!(parse_command("/"), None);
        assert_eq!(parse_command("/@bot"), None);
        assert_eq!(parse_command("/ ping"), None);
    }

    #[test]
    fn event_from_message() {
        let event = InboundEvent::from_message(&message(Some("/ping ops"), Some("alice"))).unwrap();
        assert_eq!(event.requester_id, 77);
        assert_eq!(event.requester_handle, "alice");
        assert_eq!(event.chat_id, -100);
        assert_eq!(event.command.unwrap().args, "ops");

        let mention = InboundEvent::from_message(&message(Some("@ops"), None)).unwrap();
        assert_eq!(mention.requester_handle, "");
        assert!(mention.command.is_none());
    }

    #[test]
    fn messages_without_text_or_sender_are_dropped() {
        assert!(InboundEvent::from_message(&message(None, Some("alice"))).is_none());

        let mut anonymous = message(Some("/ping"), None);
        anonymous.from = None;
        assert!(InboundEvent::from_message(&anonymous).is_none());
    }
}
