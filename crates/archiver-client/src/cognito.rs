//! Cognito user-pool session provider
//!
//! Signs in with `USER_PASSWORD_AUTH` and silently refreshes the ID token with
//! `REFRESH_TOKEN_AUTH` when it is about to expire. The tokens themselves are
//! treated as opaque strings.

use crate::client::{HttpClientConfig, create_client, error_message, network_error};
use crate::token_cache::{self, CachedTokens};
use archiver_core::{Error, Result, Session, SessionProvider};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

const INITIATE_AUTH_TARGET: &str = "AWSCognitoIdentityProviderService.InitiateAuth";
const AMZ_JSON: &str = "application/x-amz-json-1.1";

/// Cognito provider configuration
#[derive(Debug, Clone)]
pub struct CognitoConfig {
    /// AWS region of the user pool (default: us-east-1)
    pub region: String,

    /// App client id (must allow USER_PASSWORD_AUTH and have no client secret)
    pub client_id: String,

    /// Override the identity endpoint (default: https://cognito-idp.{region}.amazonaws.com/)
    pub endpoint: Option<String>,

    /// Persist tokens here between runs
    pub token_cache: Option<PathBuf>,

    /// Refresh this many seconds before the ID token expires
    pub refresh_skew_secs: i64,

    /// HTTP client configuration
    pub client_config: HttpClientConfig,
}

impl CognitoConfig {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            region: "us-east-1".to_string(),
            client_id: client_id.into(),
            endpoint: None,
            token_cache: None,
            refresh_skew_secs: 60,
            client_config: HttpClientConfig::default(),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_token_cache(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_cache = Some(path.into());
        self
    }

    fn endpoint_url(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("https://cognito-idp.{}.amazonaws.com/", self.region))
    }
}

#[derive(Debug, Deserialize)]
struct InitiateAuthResponse {
    #[serde(rename = "AuthenticationResult")]
    authentication_result: Option<AuthenticationResult>,
    #[serde(rename = "ChallengeName")]
    challenge_name: Option<String>,
}

#[derive(Deserialize)]
struct AuthenticationResult {
    #[serde(rename = "IdToken")]
    id_token: String,
    #[serde(rename = "AccessToken")]
    access_token: String,
    #[serde(rename = "RefreshToken")]
    refresh_token: Option<String>,
    #[serde(rename = "ExpiresIn")]
    expires_in: i64,
}

impl std::fmt::Debug for AuthenticationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticationResult")
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}

/// Cognito-backed [`SessionProvider`]
pub struct CognitoSessionProvider {
    config: CognitoConfig,
    client: Client,
    tokens: Mutex<Option<CachedTokens>>,
}

impl CognitoSessionProvider {
    /// Create a provider, restoring cached tokens if a cache file is configured
    pub fn new(config: CognitoConfig) -> Result<Self> {
        if config.client_id.trim().is_empty() {
            return Err(Error::Config("Cognito client id must not be empty".to_string()));
        }
        let client = create_client(&config.client_config)?;
        let cached = match &config.token_cache {
            Some(path) => token_cache::load(path)?,
            None => None,
        };
        if let Some(tokens) = &cached {
            info!("Restored session for {}", tokens.username);
        }
        Ok(Self {
            config,
            client,
            tokens: Mutex::new(cached),
        })
    }

    async fn initiate_auth(
        &self,
        flow: &str,
        parameters: serde_json::Value,
    ) -> Result<AuthenticationResult> {
        let body = json!({
            "AuthFlow": flow,
            "ClientId": self.config.client_id,
            "AuthParameters": parameters,
        });

        let response = self
            .client
            .post(self.config.endpoint_url())
            .header("Content-Type", AMZ_JSON)
            .header("X-Amz-Target", INITIATE_AUTH_TARGET)
            .body(body.to_string())
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        let text = response.text().await.map_err(network_error)?;

        if !status.is_success() {
            let message = error_message(status.as_u16(), &text);
            // 4xx from the user pool means the credentials were refused
            return Err(if status.is_client_error() {
                Error::Auth(message)
            } else {
                Error::server(Some(status.as_u16()), message)
            });
        }

        let parsed: InitiateAuthResponse = serde_json::from_str(&text).map_err(|e| {
            Error::server(None, format!("unexpected response from identity provider: {}", e))
        })?;

        match (parsed.authentication_result, parsed.challenge_name) {
            (Some(result), _) => Ok(result),
            (None, Some(challenge)) => Err(Error::Auth(format!(
                "Sign-in requires the {} challenge, which is not supported",
                challenge
            ))),
            (None, None) => Err(Error::server(
                None,
                "identity provider returned no tokens",
            )),
        }
    }

    fn persist(&self, tokens: &CachedTokens) {
        if let Some(path) = &self.config.token_cache
            && let Err(e) = token_cache::store(path, tokens)
        {
            warn!("Failed to persist session tokens: {}", e);
        }
    }

    fn forget(&self) {
        if let Some(path) = &self.config.token_cache
            && let Err(e) = token_cache::clear(path)
        {
            warn!("Failed to remove token cache: {}", e);
        }
    }

    /// Refresh while already holding the token lock
    async fn refresh_locked(&self, slot: &mut Option<CachedTokens>) -> Result<Option<Session>> {
        let Some(current) = slot.clone() else {
            return Ok(None);
        };
        let Some(refresh_token) = current.refresh_token.clone() else {
            warn!("No refresh token for {}, signing out", current.username);
            *slot = None;
            self.forget();
            return Ok(None);
        };

        debug!("Refreshing session for {}", current.username);
        match self
            .initiate_auth("REFRESH_TOKEN_AUTH", json!({ "REFRESH_TOKEN": refresh_token }))
            .await
        {
            Ok(result) => {
                let tokens = CachedTokens {
                    username: current.username,
                    id_token: result.id_token,
                    access_token: result.access_token,
                    // the refresh flow does not rotate the refresh token
                    refresh_token: result.refresh_token.or(Some(refresh_token)),
                    expires_at: Utc::now() + Duration::seconds(result.expires_in),
                };
                self.persist(&tokens);
                let session = to_session(&tokens);
                *slot = Some(tokens);
                Ok(Some(session))
            }
            Err(Error::Auth(message)) => {
                warn!("Refresh rejected, signing out: {}", message);
                *slot = None;
                self.forget();
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

fn to_session(tokens: &CachedTokens) -> Session {
    Session::new(&tokens.username, &tokens.id_token).with_expiry(tokens.expires_at)
}

#[async_trait]
impl SessionProvider for CognitoSessionProvider {
    async fn session(&self) -> Result<Option<Session>> {
        let mut slot = self.tokens.lock().await;
        let skew = Duration::seconds(self.config.refresh_skew_secs);

        match slot.as_ref().map(to_session) {
            None => Ok(None),
            Some(session) if session.expires_within(Utc::now(), skew) => {
                self.refresh_locked(&mut slot).await
            }
            Some(session) => Ok(Some(session)),
        }
    }

    async fn refresh(&self) -> Result<Option<Session>> {
        let mut slot = self.tokens.lock().await;
        self.refresh_locked(&mut slot).await
    }

    #[instrument(skip(self, password))]
    async fn sign_in(&self, username: &str, password: &str) -> Result<Session> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(Error::Validation(
                "Username and password are required.".to_string(),
            ));
        }

        let result = self
            .initiate_auth(
                "USER_PASSWORD_AUTH",
                json!({ "USERNAME": username, "PASSWORD": password }),
            )
            .await?;

        let tokens = CachedTokens {
            username: username.to_string(),
            id_token: result.id_token,
            access_token: result.access_token,
            refresh_token: result.refresh_token,
            expires_at: Utc::now() + Duration::seconds(result.expires_in),
        };
        self.persist(&tokens);
        let session = to_session(&tokens);
        *self.tokens.lock().await = Some(tokens);

        info!("Signed in as {}", username);
        Ok(session)
    }

    async fn sign_out(&self) -> Result<()> {
        let previous = self.tokens.lock().await.take();
        self.forget();
        if let Some(tokens) = previous {
            info!("Signed out {}", tokens.username);
        }
        Ok(())
    }

    async fn identity(&self) -> Option<String> {
        self.tokens.lock().await.as_ref().map(|t| t.username.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint_from_region() {
        let config = CognitoConfig::new("client").with_region("eu-west-1");
        assert_eq!(config.endpoint_url(), "https://cognito-idp.eu-west-1.amazonaws.com/");

        let config = config.with_endpoint("http://localhost:9229/");
        assert_eq!(config.endpoint_url(), "http://localhost:9229/");
    }

    #[test]
    fn test_empty_client_id_rejected() {
        assert!(matches!(
            CognitoSessionProvider::new(CognitoConfig::new(" ")),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_blank_credentials_rejected_locally() {
        let provider = CognitoSessionProvider::new(
            CognitoConfig::new("client").with_endpoint("http://127.0.0.1:9/"),
        )
        .unwrap();
        let err = provider.sign_in("  ", "pw").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(provider.identity().await.is_none());
    }
}
