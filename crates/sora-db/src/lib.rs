//! Account persistence for Soramoyou.
//!
//! Owns the SQLite database holding signed-in Bluesky accounts and their
//! session tokens. At most one account is active at a time.

mod db;
mod error;
mod migrations;
mod models;

pub use db::Database;
pub use error::{DatabaseError, DatabaseResult};
pub use migrations::CURRENT_VERSION;
pub use models::{Account, NewAccount};
