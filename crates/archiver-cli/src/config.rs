//! Archiver configuration: file plus environment overrides

use anyhow::{Context, bail};
use archiver_client::{
    ApiConfig, ArchiverClient, CognitoConfig, CognitoSessionProvider, HttpClientConfig,
};
use archiver_core::{Session, SessionProvider, StaticSessionProvider};
use archiver_ui::UiConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchiverConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub auth: AuthSettings,

    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL of the archive API, fixed per deployment
    #[serde(default)]
    pub base_url: String,

    /// Send `Bearer <token>` instead of the raw token
    #[serde(default)]
    pub bearer_prefix: bool,

    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Cognito user pool sign-in; takes precedence over `id_token`
    #[serde(default)]
    pub cognito: Option<CognitoSettings>,

    /// Pre-issued ID token
    #[serde(default)]
    pub id_token: Option<String>,

    /// Name shown for a pre-issued token
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CognitoSettings {
    pub client_id: String,

    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default = "default_token_cache")]
    pub token_cache: String,

    #[serde(default = "default_refresh_skew")]
    pub refresh_skew_secs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl CognitoSettings {
    fn new(client_id: String) -> Self {
        Self {
            client_id,
            region: default_region(),
            endpoint: None,
            token_cache: default_token_cache(),
            refresh_skew_secs: default_refresh_skew(),
        }
    }

    /// Cache file with a leading `~` expanded
    pub fn token_cache_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.token_cache).to_string())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ArchiverConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&contents)?
        } else {
            // Default to YAML
            serde_yaml::from_str(&contents)?
        };

        Ok(config)
    }

    /// Merge environment variables into config (env vars take precedence).
    ///
    /// Returns a warning for each variable that was ignored, for logging once
    /// tracing is up.
    #[must_use]
    pub fn merge_env(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Ok(val) = std::env::var("ARCHIVER_API_URL") {
            self.api.base_url = val;
        }

        if let Ok(val) = std::env::var("ARCHIVER_ID_TOKEN") {
            self.auth.id_token = Some(val);
        }

        if let Ok(val) = std::env::var("ARCHIVER_USERNAME") {
            self.auth.username = Some(val);
        }

        if let Ok(val) = std::env::var("ARCHIVER_COGNITO_CLIENT_ID") {
            match self.auth.cognito.as_mut() {
                Some(cognito) => cognito.client_id = val,
                None => self.auth.cognito = Some(CognitoSettings::new(val)),
            }
        }

        // The remaining Cognito settings only refine an existing section
        if let Some(cognito) = self.auth.cognito.as_mut() {
            if let Ok(val) = std::env::var("ARCHIVER_COGNITO_REGION") {
                cognito.region = val;
            }
            if let Ok(val) = std::env::var("ARCHIVER_COGNITO_ENDPOINT") {
                cognito.endpoint = Some(val);
            }
            if let Ok(val) = std::env::var("ARCHIVER_TOKEN_CACHE") {
                cognito.token_cache = val;
            }
        }

        if let Ok(val) = std::env::var("ARCHIVER_UI_HOST") {
            self.ui.host = val;
        }

        if let Ok(val) = std::env::var("ARCHIVER_UI_PORT") {
            match val.parse::<u16>() {
                Ok(port) => self.ui.port = port,
                Err(_) => {
                    warnings.push(format!("Ignoring invalid ARCHIVER_UI_PORT '{}'", val))
                }
            }
        }

        if let Ok(val) = std::env::var("ARCHIVER_LOG_LEVEL") {
            self.logging.level = val;
        }

        warnings
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let base_url = self.api.base_url.trim();
        if base_url.is_empty() {
            bail!("api.base_url is required (or set ARCHIVER_API_URL)");
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            bail!("api.base_url must be an http(s) URL, got '{}'", base_url);
        }

        match &self.auth.cognito {
            Some(cognito) if cognito.client_id.trim().is_empty() => {
                bail!("auth.cognito.client_id must not be empty")
            }
            Some(_) => Ok(()),
            None if self.static_token().is_some() => Ok(()),
            None => bail!(
                "No credentials configured: set auth.cognito.client_id or auth.id_token \
                 (ARCHIVER_COGNITO_CLIENT_ID / ARCHIVER_ID_TOKEN)"
            ),
        }
    }

    fn static_token(&self) -> Option<&str> {
        self.auth
            .id_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    fn http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            timeout_secs: self.api.timeout_secs,
            connect_timeout_secs: self.api.connect_timeout_secs,
            ..HttpClientConfig::default()
        }
    }

    /// Build the session provider selected by the auth section
    pub fn session_provider(&self) -> anyhow::Result<Arc<dyn SessionProvider>> {
        if let Some(cognito) = &self.auth.cognito {
            if self.auth.id_token.is_some() {
                warn!("Both Cognito and a static ID token are configured; using Cognito");
            }
            let mut config = CognitoConfig::new(cognito.client_id.clone())
                .with_region(cognito.region.clone())
                .with_token_cache(cognito.token_cache_path());
            if let Some(endpoint) = &cognito.endpoint {
                config = config.with_endpoint(endpoint.clone());
            }
            config.refresh_skew_secs = cognito.refresh_skew_secs;
            config.client_config = self.http_client_config();

            info!("Using Cognito user pool client {}", cognito.client_id);
            return Ok(Arc::new(CognitoSessionProvider::new(config)?));
        }

        match self.static_token() {
            Some(token) => {
                let username = self.auth.username.as_deref().unwrap_or("archiver");
                info!("Using static ID token for {}", username);
                Ok(Arc::new(StaticSessionProvider::new(Session::new(
                    username, token,
                ))))
            }
            None => bail!("No credentials configured"),
        }
    }

    pub fn api_client(&self, sessions: Arc<dyn SessionProvider>) -> anyhow::Result<ArchiverClient> {
        let mut config = ApiConfig::new(self.api.base_url.trim())
            .with_bearer_prefix(self.api.bearer_prefix);
        config.client_config = self.http_client_config();
        Ok(ArchiverClient::new(config, sessions)?)
    }
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_token_cache() -> String {
    "~/.archiver/tokens.json".to_string()
}

fn default_refresh_skew() -> i64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}
