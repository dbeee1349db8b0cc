//! Session lifecycle for Soramoyou.
//!
//! [`SessionManager`] owns login, resume, refresh, logout, and account
//! switching over an [`AtpClient`] seam; [`guard`] derives the route a UI
//! should show from the manager's snapshot.

mod client;
mod error;
pub mod guard;
mod session;

pub use client::{AtpClient, AtpProfile, AtpSession, ClientFactory, XrpcClient};
pub use error::{AuthError, AuthResult};
pub use session::{
    SessionManager, SessionSnapshot, SessionTokens, UserProfile, REFRESH_INTERVAL, SESSION_TTL,
};
