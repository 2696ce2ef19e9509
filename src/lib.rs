//! User identity core for a web application's authentication subsystem.
//!
//! Accounts are addressed by email, carry a unique alphanumeric username,
//! and are created exclusively through [`UserManager`] so that required
//! fields, validation and password hashing are never bypassed. Storage is
//! an injected [`UserStore`]; [`PgUserStore`] persists to Postgres and
//! [`MemoryUserStore`] backs tests.

pub mod config;
pub mod error;
pub mod user;

pub use config::AppConfig;
pub use error::{Error, FieldViolation};
pub use user::{has_permission, MemoryUserStore, NewUser, PgUserStore, User, UserManager, UserStore};
