//! Shared HTTP client utilities

use archiver_core::{Error, Result};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Whole-request timeout in seconds. Unset means requests wait for the
    /// transport's own timeout.
    pub timeout_secs: Option<u64>,

    /// Connection timeout in seconds
    pub connect_timeout_secs: Option<u64>,

    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            connect_timeout_secs: None,
            user_agent: format!("Archiver/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Create a configured HTTP client
pub fn create_client(config: &HttpClientConfig) -> Result<Client> {
    let mut builder = ClientBuilder::new().user_agent(&config.user_agent);

    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = config.connect_timeout_secs {
        builder = builder.connect_timeout(Duration::from_secs(secs));
    }

    builder
        .build()
        .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Map a transport failure to the error taxonomy
pub(crate) fn network_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Network(format!("Request timed out: {}", err))
    } else {
        Error::Network(format!("Network Error: {}", err))
    }
}

/// Pull a human-readable message out of an error body.
///
/// Looks for `message`, `Message` then `error`; falls back to a generic
/// status line when the body carries none of them.
pub(crate) fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            ["message", "Message", "error"]
                .iter()
                .find_map(|key| json.get(key).and_then(|v| v.as_str()).map(str::to_string))
        })
        .filter(|msg| !msg.trim().is_empty())
        .unwrap_or_else(|| format!("Request failed with status code {}", status))
}
