//! Archive API client
//!
//! All four endpoints are `POST` with a JSON body and the caller's ID token in
//! the `Authorization` header. The token is fetched from the session provider
//! on every call and never cached here.

use crate::client::{HttpClientConfig, create_client, error_message, network_error};
use archiver_core::{
    ArchiveApi, ArchivedUrl, Error, PreviewLink, Result, SessionProvider, Version,
};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

const LIST_URLS_PATH: &str = "/listurls";
const SUBMIT_URL_PATH: &str = "/urls";
const LIST_VERSIONS_PATH: &str = "/archives";
const PREVIEW_PATH: &str = "/preview";

/// Archive API configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL of the deployed API stage, e.g. `https://abc.execute-api.us-east-1.amazonaws.com/v1`
    pub base_url: String,

    /// Send `Authorization: Bearer <token>` instead of the raw token
    pub bearer_prefix: bool,

    /// HTTP client configuration
    pub client_config: HttpClientConfig,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bearer_prefix: false,
            client_config: HttpClientConfig::default(),
        }
    }

    pub fn with_bearer_prefix(mut self, bearer_prefix: bool) -> Self {
        self.bearer_prefix = bearer_prefix;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[derive(Serialize)]
struct UrlBody<'a> {
    url: &'a str,
}

#[derive(Serialize)]
struct PreviewBody<'a> {
    path: &'a str,
}

#[derive(Deserialize)]
struct PreviewResponse {
    #[serde(rename = "presignedUrl", default)]
    presigned_url: Option<String>,
}

/// HTTP implementation of [`ArchiveApi`]
pub struct ArchiverClient {
    config: ApiConfig,
    client: Client,
    sessions: Arc<dyn SessionProvider>,
}

impl ArchiverClient {
    /// Create a new client bound to a session provider
    pub fn new(config: ApiConfig, sessions: Arc<dyn SessionProvider>) -> Result<Self> {
        if config.base_url.trim().is_empty() {
            return Err(Error::Config("API base URL must not be empty".to_string()));
        }
        let client = create_client(&config.client_config)?;
        Ok(Self {
            config,
            client,
            sessions,
        })
    }

    async fn authorization(&self) -> Result<String> {
        let session = self.sessions.session().await?.ok_or_else(Error::no_token)?;
        if session.id_token.is_empty() {
            return Err(Error::no_token());
        }
        Ok(if self.config.bearer_prefix {
            format!("Bearer {}", session.id_token)
        } else {
            session.id_token
        })
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        let authorization = self.authorization().await?;
        let endpoint = self.config.endpoint(path);
        debug!("POST {}", endpoint);

        self.client
            .post(&endpoint)
            .header("Authorization", authorization)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!("POST {} failed: {}", endpoint, e);
                network_error(e)
            })
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let body = Self::read_success_body(response).await?;
        serde_json::from_str(&body).map_err(|e| {
            Error::server(None, format!("unexpected response from server: {}", e))
        })
    }

    async fn read_success_body(response: Response) -> Result<String> {
        let status = response.status();
        let url = response.url().to_string();
        let body = response.text().await.map_err(network_error)?;

        if !status.is_success() {
            let message = error_message(status.as_u16(), &body);
            warn!("{} returned {}: {}", url, status, message);
            return Err(Error::server(Some(status.as_u16()), message));
        }
        Ok(body)
    }
}

fn require_non_blank<'a>(value: &'a str, what: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(format!("{} must not be empty", what)));
    }
    Ok(trimmed)
}

#[async_trait]
impl ArchiveApi for ArchiverClient {
    #[instrument(skip(self))]
    async fn list_urls(&self) -> Result<Vec<ArchivedUrl>> {
        let response = self.post(LIST_URLS_PATH, &serde_json::json!({})).await?;
        let urls: Vec<ArchivedUrl> = Self::read_json(response).await?;
        debug!("Fetched {} archived URLs", urls.len());
        Ok(urls)
    }

    #[instrument(skip(self))]
    async fn submit_url(&self, url: &str) -> Result<()> {
        let url = require_non_blank(url, "URL")?;
        let response = self.post(SUBMIT_URL_PATH, &UrlBody { url }).await?;
        // payload shape is backend-defined; only the status matters
        Self::read_success_body(response).await?;
        debug!("Submitted {} for archiving", url);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_versions(&self, url: &str) -> Result<Vec<Version>> {
        // sent as handed over; it is the backend's lookup key
        require_non_blank(url, "URL")?;
        let response = self.post(LIST_VERSIONS_PATH, &UrlBody { url }).await?;
        let versions: Vec<Version> = Self::read_json(response).await?;
        debug!("Fetched {} versions for {}", versions.len(), url);
        Ok(versions)
    }

    #[instrument(skip(self))]
    async fn request_preview_link(&self, storage_path: &str) -> Result<PreviewLink> {
        let response = self
            .post(PREVIEW_PATH, &PreviewBody { path: storage_path })
            .await?;
        let preview: PreviewResponse = Self::read_json(response).await?;

        match preview.presigned_url {
            Some(link) if !link.trim().is_empty() => Ok(PreviewLink::new(link)),
            _ => Err(Error::server(None, "missing preview link")),
        }
    }

    #[instrument(skip(self, link))]
    async fn fetch_snapshot(&self, link: &PreviewLink) -> Result<String> {
        // presigned: no Authorization header
        let response = self
            .client
            .get(link.as_str())
            .send()
            .await
            .map_err(network_error)?;
        let html = Self::read_success_body(response).await?;
        debug!("Fetched snapshot ({} bytes)", html.len());
        Ok(html)
    }
}
