//! Error types for the archiver

use thiserror::Error;

/// Message shown when no usable bearer token is available
pub const NO_TOKEN_MESSAGE: &str = "Authentication token not found. Please log in.";

#[derive(Debug, Error)]
pub enum Error {
    /// Client-side input rejection; no network call was made
    #[error("{0}")]
    Validation(String),

    /// No usable token, or the identity provider refused the credentials
    #[error("{0}")]
    Auth(String),

    /// Transport-level failure, no response received
    #[error("{0}")]
    Network(String),

    /// Non-success response, or a success response the client cannot use
    #[error("{message}")]
    Server { status: Option<u16>, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn no_token() -> Self {
        Error::Auth(NO_TOKEN_MESSAGE.to_string())
    }

    pub fn server(status: Option<u16>, message: impl Into<String>) -> Self {
        Error::Server {
            status,
            message: message.into(),
        }
    }

    /// Whether the error was raised before anything left the process
    pub fn is_local(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
