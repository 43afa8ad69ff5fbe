//! Command routing for admitted chat requests.
//!
//! [`Dispatcher`] maps a command (or an `@role` mention) to a [`RoleStore`]
//! call and renders the reply text. Directory errors become one-line replies;
//! nothing here is fatal to the caller.
//!
//! [`RoleStore`]: role_directory::RoleStore

mod command;
mod dispatcher;
pub mod messages;

pub use command::{AuthLevel, Command};
pub use dispatcher::Dispatcher;
