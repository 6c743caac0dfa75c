//! View state machines
//!
//! Each view holds plain state and synchronous transitions. The async calls
//! that drive them live in [`crate::dashboard`].

pub mod submission;
pub mod url_list;
pub mod versions;

use archiver_core::Error;

/// Progress of a fetch owned by a view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState<T> {
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    /// Settle a fetch, turning any error into its user-visible message
    pub fn settle(result: archiver_core::Result<T>, context: &str) -> Self {
        match result {
            Ok(value) => LoadState::Loaded(value),
            Err(err) => LoadState::Failed(describe(context, &err)),
        }
    }
}

/// User-visible message for a failed operation.
///
/// Validation and auth messages are already phrased for the user; everything
/// else is prefixed with what was being attempted.
pub fn describe(context: &str, err: &Error) -> String {
    match err {
        Error::Validation(message) | Error::Auth(message) => message.clone(),
        other => format!("{}: {}", context, other),
    }
}
