//! Persistent role directory for the Rolecall bot.
//!
//! This crate provides:
//! - Async SQLite executor with a dedicated thread
//! - Schema migrations for roles, users and role memberships
//! - Name/handle normalization applied before every store operation
//! - [`RoleDirectory`], the transactional store behind the [`RoleStore`] trait
//!
//! # Architecture
//!
//! All SQLite work runs on the single executor thread owned by
//! [`AsyncDatabase`]. Multi-step mutations (adding a member, removing a role)
//! run inside one `IMMEDIATE` transaction on that thread, so readers never
//! observe a half-applied change and a racing remove cannot leave a dangling
//! membership.
//!
//! ```ignore
//! let directory = RoleDirectory::open(path, Duration::from_secs(5)).await?;
//! directory.create_role("ops").await?;
//! directory.add_user_to_role("ops", "@alice").await?;
//! assert_eq!(directory.get_users_in_role("OPS").await?, vec!["alice"]);
//! ```

mod directory;
mod error;
mod executor;
mod migrations;
mod models;
mod normalize;
pub mod queries;

pub use directory::{RoleDirectory, RoleStore};
pub use error::{DirectoryError, DirectoryResult, StorageError, StorageResult};
pub use executor::AsyncDatabase;
pub use migrations::{run_migrations, CURRENT_VERSION};
pub use models::{Role, User};
pub use normalize::{normalize_handle, normalize_role_name, MAX_NAME_LEN};
