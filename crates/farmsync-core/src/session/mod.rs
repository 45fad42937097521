//! Authenticated session with an explicit login/logout lifecycle.
//!
//! The session is persisted in the mirror store under its own key and kept
//! until logout clears it. Synchronizers read the access token from here on
//! every online call.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::watch;

use crate::error::{Error, Result};
use crate::gateway::{ApiClient, Method};
use crate::mirror::MirrorStore;
use crate::records::{RecordId, Role};

const SESSION_KEY: &str = "session";
const LOGIN_PATH: &str = "/token/";
const REFRESH_PATH: &str = "/token/refresh/";

/// The account that signed in, as reported by the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access: String,
    pub refresh: String,
    pub user: SessionUser,
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthSession")
            .field("access", &"[REDACTED]")
            .field("refresh", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
    #[serde(default)]
    refresh: Option<String>,
}

/// Shared handle to the current session.
#[derive(Clone)]
pub struct Session {
    current: watch::Sender<Option<AuthSession>>,
    mirror: MirrorStore,
}

impl Session {
    /// Start signed out without consulting the mirror.
    pub fn signed_out(mirror: MirrorStore) -> Self {
        let (current, _) = watch::channel(None);
        Self { current, mirror }
    }

    /// Load the persisted session, if any.
    pub async fn restore(mirror: MirrorStore) -> Result<Self> {
        let stored = mirror.get_value::<AuthSession>(SESSION_KEY).await?;
        if let Some(session) = &stored {
            tracing::info!("Restored session for {}", session.user.username);
        }
        let (current, _) = watch::channel(stored);
        Ok(Self { current, mirror })
    }

    pub fn current(&self) -> Option<AuthSession> {
        self.current.borrow().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.current
            .borrow()
            .as_ref()
            .map(|session| session.access.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Observe login, refresh, and logout.
    pub fn subscribe(&self) -> watch::Receiver<Option<AuthSession>> {
        self.current.subscribe()
    }

    /// Exchange credentials for tokens and persist the session.
    ///
    /// The login call is anonymous: no bearer header is sent.
    pub async fn login(
        &self,
        gateway: &ApiClient,
        username: &str,
        password: &str,
    ) -> Result<AuthSession> {
        validate_credentials(username, password)?;

        let payload = json!({
            "username": username.trim(),
            "password": password,
        });
        let session: AuthSession = gateway
            .request_as(Method::Post, LOGIN_PATH, Some(&payload), None)
            .await?;

        self.mirror.put_value(SESSION_KEY, &session).await?;
        self.current.send_replace(Some(session.clone()));
        tracing::info!("Signed in as {}", session.user.username);
        Ok(session)
    }

    /// Obtain a fresh access token using the stored refresh token.
    pub async fn refresh(&self, gateway: &ApiClient) -> Result<AuthSession> {
        let mut session = self.current().ok_or(Error::NotAuthenticated)?;

        let payload = json!({ "refresh": session.refresh });
        let response: RefreshResponse = gateway
            .request_as(Method::Post, REFRESH_PATH, Some(&payload), None)
            .await?;

        session.access = response.access;
        if let Some(rotated) = response.refresh {
            session.refresh = rotated;
        }

        self.mirror.put_value(SESSION_KEY, &session).await?;
        self.current.send_replace(Some(session.clone()));
        tracing::debug!("Refreshed access token for {}", session.user.username);
        Ok(session)
    }

    /// Forget the session in memory and on disk.
    pub async fn logout(&self) -> Result<()> {
        self.mirror.remove_value(SESSION_KEY).await?;
        if let Some(previous) = self.current.send_replace(None) {
            tracing::info!("Signed out {}", previous.user.username);
        }
        Ok(())
    }
}

fn validate_credentials(username: &str, password: &str) -> Result<()> {
    if username.trim().is_empty() {
        return Err(Error::InvalidInput("Username is required".to_string()));
    }
    if password.is_empty() {
        return Err(Error::InvalidInput("Password is required".to_string()));
    }
    Ok(())
}
