//! Session lifecycle management.

use crate::{AtpClient, AuthError, AuthResult, ClientFactory};
use chrono::{DateTime, Duration, Utc};
use sora_db::{Database, NewAccount};
use sora_i18n::Translator;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// How long freshly issued access tokens are treated as valid.
pub const SESSION_TTL: Duration = Duration::hours(2);

/// Fixed delay before the background refresh fires, 30 minutes ahead of
/// expiry.
pub const REFRESH_INTERVAL: std::time::Duration = std::time::Duration::from_secs(90 * 60);

/// In-memory session tokens for the active account.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionTokens {
    pub did: String,
    pub handle: String,
    pub service_url: String,
    pub access_jwt: String,
    pub refresh_jwt: String,
    pub expires_at: DateTime<Utc>,
}

/// Profile of the signed-in user.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub did: String,
    pub handle: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Point-in-time view of the session state.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub session: Option<SessionTokens>,
    pub user: Option<UserProfile>,
    pub authenticated: bool,
    /// Whether startup resume has completed (successfully or not).
    pub initialized: bool,
    /// Localized message of the most recent failure.
    pub last_error: Option<String>,
}

/// Owns the session lifecycle for the active account.
///
/// All collaborators are passed in at construction. Public entry points
/// report success as `bool` and record failures in the snapshot's error slot
/// instead of propagating them; the UI layer reads state, it does not handle
/// errors.
pub struct SessionManager {
    db: Arc<Mutex<Database>>,
    translator: Translator,
    client_factory: ClientFactory,
    client: Mutex<Option<Arc<dyn AtpClient>>>,
    state: Mutex<SessionSnapshot>,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
}

impl SessionManager {
    /// Create a new session manager.
    pub fn new(
        db: Arc<Mutex<Database>>,
        translator: Translator,
        client_factory: ClientFactory,
    ) -> Self {
        Self {
            db,
            translator,
            client_factory,
            client: Mutex::new(None),
            state: Mutex::new(SessionSnapshot::default()),
            refresh_task: Mutex::new(None),
        }
    }

    /// Current session state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.lock().unwrap().clone()
    }

    /// Translate an error into its fixed user-facing message and record it.
    fn record_error(&self, error: &AuthError) {
        let message = self.translator.translate(error.message_key());
        warn!(error = %error, message = %message, "Session operation failed");
        self.state.lock().unwrap().last_error = Some(message);
    }

    fn build_client(&self, service_url: &str) -> AuthResult<Arc<dyn AtpClient>> {
        let client = (self.client_factory)(service_url)?;
        *self.client.lock().unwrap() = Some(Arc::clone(&client));
        Ok(client)
    }

    /// Sign in with a handle and app password.
    ///
    /// On success the account is persisted as the only active one, in-memory
    /// state is populated, and the background refresh is armed.
    pub async fn login(
        self: &Arc<Self>,
        service_url: &str,
        handle: &str,
        app_password: &str,
    ) -> bool {
        info!(service_url = %service_url, handle = %handle, "Logging in");

        let client = match self.build_client(service_url) {
            Ok(client) => client,
            Err(e) => {
                self.record_error(&e);
                return false;
            }
        };

        let session = match client.create_session(handle, app_password).await {
            Ok(session) => session,
            Err(e) => {
                self.record_error(&e);
                return false;
            }
        };

        // The profile is part of the login result; a fetch failure fails
        // the whole operation and nothing is persisted.
        let profile = match client.get_profile(&session.access_jwt, &session.did).await {
            Ok(profile) => profile,
            Err(e) => {
                self.record_error(&e);
                return false;
            }
        };

        let expires_at = Utc::now() + SESSION_TTL;
        let new_account = NewAccount {
            handle: session.handle.clone(),
            did: session.did.clone(),
            service_url: client.service_url().to_string(),
            access_jwt: session.access_jwt.clone(),
            refresh_jwt: session.refresh_jwt.clone(),
            avatar_url: profile.avatar.clone(),
            session_expires_at: expires_at,
        };

        if let Err(e) = self.db.lock().unwrap().upsert_account(&new_account) {
            self.record_error(&AuthError::from(e));
            return false;
        }

        {
            let mut state = self.state.lock().unwrap();
            state.session = Some(SessionTokens {
                did: session.did.clone(),
                handle: session.handle.clone(),
                service_url: client.service_url().to_string(),
                access_jwt: session.access_jwt,
                refresh_jwt: session.refresh_jwt,
                expires_at,
            });
            state.user = Some(UserProfile {
                did: session.did.clone(),
                handle: session.handle,
                display_name: profile.display_name.clone(),
                avatar_url: profile.avatar.clone(),
            });
            state.authenticated = true;
            state.initialized = true;
            state.last_error = None;
        }

        self.arm_refresh_timer();
        info!(did = %session.did, "Login successful");
        true
    }

    /// Restore the session for the active account on startup.
    ///
    /// Returns false when no active account exists. An expired record routes
    /// through [`SessionManager::refresh`]. The snapshot is marked
    /// initialized whichever way this resolves.
    pub async fn resume_from_storage(self: &Arc<Self>) -> bool {
        let result = self.resume_inner().await;
        self.state.lock().unwrap().initialized = true;
        result
    }

    async fn resume_inner(self: &Arc<Self>) -> bool {
        let account = match self.db.lock().unwrap().get_active_account() {
            Ok(Some(account)) => account,
            Ok(None) => {
                debug!("No active account to resume");
                return false;
            }
            Err(e) => {
                self.record_error(&AuthError::from(e));
                return false;
            }
        };

        if account.session_expires_at <= Utc::now() {
            info!(did = %account.did, "Stored session expired, refreshing");
            return self.refresh(Some(account)).await;
        }

        let client = match self.build_client(&account.service_url) {
            Ok(client) => client,
            Err(e) => {
                self.record_error(&e);
                return false;
            }
        };

        // Resume re-fetches the profile; a failure fails the resume and the
        // UI lands on the login route with the recorded error.
        let profile = match client.get_profile(&account.access_jwt, &account.did).await {
            Ok(profile) => profile,
            Err(e) => {
                self.record_error(&e);
                return false;
            }
        };

        {
            let mut state = self.state.lock().unwrap();
            state.session = Some(SessionTokens {
                did: account.did.clone(),
                handle: account.handle.clone(),
                service_url: account.service_url.clone(),
                access_jwt: account.access_jwt.clone(),
                refresh_jwt: account.refresh_jwt.clone(),
                expires_at: account.session_expires_at,
            });
            state.user = Some(UserProfile {
                did: account.did.clone(),
                handle: account.handle.clone(),
                display_name: profile.display_name.clone(),
                avatar_url: profile.avatar.clone().or(account.avatar_url.clone()),
            });
            state.authenticated = true;
            state.last_error = None;
        }

        self.arm_refresh_timer();
        info!(did = %account.did, "Session resumed");
        true
    }

    /// Rotate the session tokens, persisting the new pair.
    ///
    /// Uses the given account record or loads the active one. A failed
    /// rotation forces logout and records a session-expired message.
    pub async fn refresh(self: &Arc<Self>, record: Option<sora_db::Account>) -> bool {
        let account = match record {
            Some(account) => account,
            None => match self.db.lock().unwrap().get_active_account() {
                Ok(Some(account)) => account,
                Ok(None) => {
                    self.record_error(&AuthError::NotLoggedIn);
                    return false;
                }
                Err(e) => {
                    self.record_error(&AuthError::from(e));
                    return false;
                }
            },
        };

        let client = {
            let existing = self.client.lock().unwrap().clone();
            match existing {
                Some(client) => client,
                None => match self.build_client(&account.service_url) {
                    Ok(client) => client,
                    Err(e) => {
                        self.record_error(&e);
                        return false;
                    }
                },
            }
        };

        match client.refresh_session(&account.refresh_jwt).await {
            Ok(session) => {
                let expires_at = Utc::now() + SESSION_TTL;
                let persisted = self.db.lock().unwrap().update_session_tokens(
                    &session.did,
                    &session.access_jwt,
                    &session.refresh_jwt,
                    expires_at,
                );
                match persisted {
                    Ok(true) => {}
                    Ok(false) => {
                        warn!(did = %session.did, "Refreshed tokens for an account no longer stored");
                    }
                    Err(e) => {
                        self.record_error(&AuthError::from(e));
                        return false;
                    }
                }

                {
                    let mut state = self.state.lock().unwrap();
                    state.session = Some(SessionTokens {
                        did: session.did.clone(),
                        handle: session.handle.clone(),
                        service_url: account.service_url.clone(),
                        access_jwt: session.access_jwt,
                        refresh_jwt: session.refresh_jwt,
                        expires_at,
                    });
                    if state.user.is_none() {
                        state.user = Some(UserProfile {
                            did: session.did.clone(),
                            handle: session.handle,
                            display_name: None,
                            avatar_url: account.avatar_url.clone(),
                        });
                    }
                    state.authenticated = true;
                    state.last_error = None;
                }

                self.arm_refresh_timer();
                info!(did = %session.did, "Session refreshed");
                true
            }
            Err(e) => {
                // Single attempt; a rejected refresh token is unrecoverable,
                // so drop the session and surface the expiry message. The
                // error is recorded after logout so it survives the reset.
                warn!(did = %account.did, error = %e, "Session refresh failed, logging out");
                self.logout();
                self.record_error(&AuthError::SessionExpired);
                false
            }
        }
    }

    /// Sign out: deactivate the stored account, cancel the pending refresh,
    /// and clear in-memory state.
    pub fn logout(&self) {
        if let Some(task) = self.refresh_task.lock().unwrap().take() {
            task.abort();
        }

        match self.db.lock().unwrap().clear_active_flags() {
            Ok(count) => debug!(cleared = count, "Active account deactivated"),
            Err(e) => warn!(error = %e, "Failed to deactivate account on logout"),
        }

        *self.client.lock().unwrap() = None;

        let mut state = self.state.lock().unwrap();
        state.session = None;
        state.user = None;
        state.authenticated = false;
        state.last_error = None;

        info!("Logged out");
    }

    /// Make another stored account the active one and resume it.
    ///
    /// Returns false when no account with that DID exists.
    pub async fn switch_account(self: &Arc<Self>, did: &str) -> bool {
        let switched = match self.db.lock().unwrap().set_active_account(did) {
            Ok(switched) => switched,
            Err(e) => {
                self.record_error(&AuthError::from(e));
                return false;
            }
        };
        if !switched {
            warn!(did = %did, "Cannot switch to unknown account");
            self.record_error(&AuthError::NotLoggedIn);
            return false;
        }

        info!(did = %did, "Switching account");
        self.resume_from_storage().await
    }

    /// Whether a background refresh is currently scheduled.
    pub fn refresh_armed(&self) -> bool {
        self.refresh_task.lock().unwrap().is_some()
    }

    /// (Re)arm the one-shot background refresh.
    fn arm_refresh_timer(self: &Arc<Self>) {
        let mut task = self.refresh_task.lock().unwrap();
        if let Some(previous) = task.take() {
            previous.abort();
        }

        let manager = Arc::clone(self);
        *task = Some(tokio::spawn(async move {
            tokio::time::sleep(REFRESH_INTERVAL).await;
            debug!("Background refresh firing");
            if !manager.refresh(None).await {
                warn!("Background refresh failed");
            }
        }));
    }
}
