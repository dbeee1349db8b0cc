//! Account row models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A signed-in account row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub id: i64,
    /// Human-readable handle (e.g. "alice.bsky.social").
    pub handle: String,
    /// Stable decentralized identifier, unique per account.
    pub did: String,
    /// Base URL of the PDS this account lives on.
    pub service_url: String,
    pub access_jwt: String,
    pub refresh_jwt: String,
    pub avatar_url: Option<String>,
    pub is_active: bool,
    pub session_expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for inserting or updating an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub handle: String,
    pub did: String,
    pub service_url: String,
    pub access_jwt: String,
    pub refresh_jwt: String,
    pub avatar_url: Option<String>,
    pub session_expires_at: DateTime<Utc>,
}
