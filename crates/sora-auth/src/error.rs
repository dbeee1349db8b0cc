//! Authentication error types.

use thiserror::Error;

/// Authentication error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The server rejected the handle/password pair (HTTP 401).
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The server could not parse the request (HTTP 400).
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// The server throttled the request (HTTP 429).
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Transport-level failure (DNS, TLS, connection, body decode).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Unclassified remote failure.
    #[error("Upstream error: HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    /// No session to operate on.
    #[error("Not logged in")]
    NotLoggedIn,

    /// The stored session is past its expiry and could not be rotated.
    #[error("Session expired")]
    SessionExpired,

    /// Account database error.
    #[error("Database error: {0}")]
    Database(#[from] sora_db::DatabaseError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AuthError {
    /// The i18n key for the fixed user-facing message of this error.
    pub fn message_key(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials(_) => "auth.error.invalidCredentials",
            AuthError::MalformedRequest(_) => "auth.error.malformedRequest",
            AuthError::RateLimited(_) => "auth.error.rateLimited",
            AuthError::Network(_) => "auth.error.network",
            AuthError::NotLoggedIn => "auth.error.resumeFailed",
            AuthError::SessionExpired => "auth.error.refreshFailed",
            AuthError::Upstream { .. } | AuthError::Database(_) | AuthError::Json(_) => {
                "auth.error.unknown"
            }
        }
    }
}

/// Result type alias using AuthError.
pub type AuthResult<T> = Result<T, AuthError>;
