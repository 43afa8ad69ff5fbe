//! Application wiring and lifecycle management.

mod backoff;
mod health;
mod init;
mod service;

pub use init::run_bot;
