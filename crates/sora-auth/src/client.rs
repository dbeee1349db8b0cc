//! AT Protocol client seam.
//!
//! The session lifecycle only needs three XRPC endpoints; they sit behind the
//! [`AtpClient`] trait so tests can script responses and the wire protocol
//! stays an external collaborator.

use crate::{AuthError, AuthResult};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// Session tokens returned by createSession and refreshSession.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtpSession {
    pub did: String,
    pub handle: String,
    pub access_jwt: String,
    pub refresh_jwt: String,
}

/// Profile view returned by app.bsky.actor.getProfile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtpProfile {
    pub did: String,
    pub handle: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Remote calls the session lifecycle depends on.
#[async_trait]
pub trait AtpClient: Send + Sync {
    /// Exchange handle and app password for session tokens.
    async fn create_session(&self, identifier: &str, password: &str) -> AuthResult<AtpSession>;

    /// Rotate session tokens. Returns the new session as a value; the caller
    /// is responsible for persisting it.
    async fn refresh_session(&self, refresh_jwt: &str) -> AuthResult<AtpSession>;

    /// Fetch the profile for an actor (handle or DID).
    async fn get_profile(&self, access_jwt: &str, actor: &str) -> AuthResult<AtpProfile>;

    /// Base URL of the PDS this client talks to.
    fn service_url(&self) -> &str;
}

/// Builds a client for a service URL. Injected so the manager never decides
/// which transport to use.
pub type ClientFactory =
    Box<dyn Fn(&str) -> AuthResult<Arc<dyn AtpClient>> + Send + Sync>;

#[derive(Debug, Serialize)]
struct CreateSessionRequest<'a> {
    identifier: &'a str,
    password: &'a str,
}

/// reqwest-backed XRPC client.
pub struct XrpcClient {
    service_url: String,
    http_client: Client,
}

impl XrpcClient {
    /// Create a client for a PDS base URL.
    pub fn new(service_url: &str) -> AuthResult<Self> {
        let parsed = Url::parse(service_url)
            .map_err(|e| AuthError::MalformedRequest(format!("invalid service URL: {e}")))?;

        Ok(Self {
            service_url: parsed.as_str().trim_end_matches('/').to_string(),
            http_client: Client::new(),
        })
    }

    /// Factory producing [`XrpcClient`] instances.
    pub fn factory() -> ClientFactory {
        Box::new(|service_url| {
            let client: Arc<dyn AtpClient> = Arc::new(XrpcClient::new(service_url)?);
            Ok(client)
        })
    }

    fn endpoint(&self, nsid: &str) -> String {
        format!("{}/xrpc/{}", self.service_url, nsid)
    }

    async fn classify_failure(response: reqwest::Response) -> AuthError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        warn!(status = %status, body = %body, "XRPC request failed");

        match status {
            StatusCode::UNAUTHORIZED => AuthError::InvalidCredentials(body),
            StatusCode::BAD_REQUEST => AuthError::MalformedRequest(body),
            StatusCode::TOO_MANY_REQUESTS => AuthError::RateLimited(body),
            _ => AuthError::Upstream {
                status: status.as_u16(),
                body,
            },
        }
    }
}

#[async_trait]
impl AtpClient for XrpcClient {
    async fn create_session(&self, identifier: &str, password: &str) -> AuthResult<AtpSession> {
        let url = self.endpoint("com.atproto.server.createSession");
        debug!(url = %url, identifier = %identifier, "Creating session");

        let response = self
            .http_client
            .post(&url)
            .json(&CreateSessionRequest {
                identifier,
                password,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::classify_failure(response).await);
        }

        Ok(response.json().await?)
    }

    async fn refresh_session(&self, refresh_jwt: &str) -> AuthResult<AtpSession> {
        let url = self.endpoint("com.atproto.server.refreshSession");
        debug!(url = %url, "Refreshing session");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(refresh_jwt)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::classify_failure(response).await);
        }

        Ok(response.json().await?)
    }

    async fn get_profile(&self, access_jwt: &str, actor: &str) -> AuthResult<AtpProfile> {
        let url = self.endpoint("app.bsky.actor.getProfile");
        debug!(url = %url, actor = %actor, "Fetching profile");

        let response = self
            .http_client
            .get(&url)
            .query(&[("actor", actor)])
            .bearer_auth(access_jwt)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::classify_failure(response).await);
        }

        Ok(response.json().await?)
    }

    fn service_url(&self) -> &str {
        &self.service_url
    }
}
