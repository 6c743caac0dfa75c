//! UI server errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum UiError {
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error(transparent)]
    Core(#[from] archiver_core::Error),
}

impl IntoResponse for UiError {
    fn into_response(self) -> Response {
        let status = match &self {
            UiError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
            UiError::Core(err) if err.is_local() => StatusCode::BAD_REQUEST,
            UiError::Core(archiver_core::Error::Auth(_)) => StatusCode::UNAUTHORIZED,
            UiError::Core(_) => StatusCode::BAD_GATEWAY,
        };
        error!("Request failed: {}", self);

        (status, self.to_string()).into_response()
    }
}
