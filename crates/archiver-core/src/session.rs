//! Session provider abstraction
//!
//! The identity provider is external. Views and the API client only ever see
//! a point-in-time [`Session`] handed out by a [`SessionProvider`].

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::{Error, Result};

/// Bearer credential for the signed-in identity
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub id_token: String,
    /// `None` when the provider does not know the expiry
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(username: impl Into<String>, id_token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            id_token: id_token.into(),
            expires_at: None,
        }
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// True if the token is expired, or will be within `skew`
    pub fn expires_within(&self, now: DateTime<Utc>, skew: Duration) -> bool {
        self.expires_at.is_some_and(|at| at - skew <= now)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("id_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Session provider trait
///
/// Implementations:
/// - `StaticSessionProvider`: fixed token from configuration or tests
/// - `CognitoSessionProvider` (archiver-client): user-pool sign-in with silent refresh
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Current session, refreshed first if it has expired and the provider can.
    /// `Ok(None)` means nobody is signed in.
    async fn session(&self) -> Result<Option<Session>>;

    /// Force a refresh of the current session
    async fn refresh(&self) -> Result<Option<Session>>;

    /// Sign in with username and password
    async fn sign_in(&self, username: &str, password: &str) -> Result<Session>;

    /// Destroy the current session
    async fn sign_out(&self) -> Result<()>;

    /// Username of the signed-in identity, without any network traffic
    async fn identity(&self) -> Option<String>;
}

/// Holds a token supplied up front. It cannot sign in or refresh.
#[derive(Debug, Default)]
pub struct StaticSessionProvider {
    session: RwLock<Option<Session>>,
}

impl StaticSessionProvider {
    pub fn new(session: Session) -> Self {
        Self {
            session: RwLock::new(Some(session)),
        }
    }

    /// A provider with nobody signed in
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// Replace the held session, e.g. to simulate a different identity
    pub async fn replace(&self, session: Option<Session>) {
        *self.session.write().await = session;
    }
}

#[async_trait]
impl SessionProvider for StaticSessionProvider {
    async fn session(&self) -> Result<Option<Session>> {
        let session = self.session.read().await.clone();
        match session {
            Some(s) if s.expires_within(Utc::now(), Duration::zero()) => {
                debug!("Static session for {} has expired", s.username);
                Ok(None)
            }
            other => Ok(other),
        }
    }

    async fn refresh(&self) -> Result<Option<Session>> {
        self.session().await
    }

    async fn sign_in(&self, _username: &str, _password: &str) -> Result<Session> {
        Err(Error::Auth(
            "Sign-in is not available with a static token; configure a Cognito user pool"
                .to_string(),
        ))
    }

    async fn sign_out(&self) -> Result<()> {
        *self.session.write().await = None;
        Ok(())
    }

    async fn identity(&self) -> Option<String> {
        self.session.read().await.as_ref().map(|s| s.username.clone())
    }
}
